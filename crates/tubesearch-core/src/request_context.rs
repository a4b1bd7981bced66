use std::cell::Cell;

use crate::models::RequestSeq;

thread_local! {
    static CURRENT_REQUEST_SEQ: Cell<Option<u64>> = const { Cell::new(None) };
}

pub fn current_request_seq() -> Option<RequestSeq> {
    CURRENT_REQUEST_SEQ.with(|slot| slot.get().map(RequestSeq))
}

pub fn with_request_seq<R>(seq: RequestSeq, operation: impl FnOnce() -> R) -> R {
    CURRENT_REQUEST_SEQ.with(|slot| {
        let previous = slot.replace(Some(seq.0));
        let result = operation();
        slot.set(previous);
        result
    })
}
