use crate::models::{
    BackendDescriptor, CoreError, CoreErrorKind, Operation, ResultList, SearchRequest,
    is_blank_query,
};

pub type AdapterResult<T> = Result<T, CoreError>;

/// Capability interface over one backend wire contract.
pub trait SearchService: Send + Sync {
    fn descriptor(&self) -> &BackendDescriptor;

    fn search(&self, request: &SearchRequest) -> AdapterResult<ResultList>;
}

pub fn ensure_searchable(
    descriptor: &BackendDescriptor,
    request: &SearchRequest,
) -> AdapterResult<()> {
    if is_blank_query(&request.query) {
        return Err(CoreError {
            backend: Some(descriptor.variant),
            operation: Some(Operation::Search),
            kind: CoreErrorKind::InvalidInput,
            message: "search query must not be empty".to_string(),
        });
    }

    if request.max_results == 0 {
        return Err(CoreError {
            backend: Some(descriptor.variant),
            operation: Some(Operation::Search),
            kind: CoreErrorKind::InvalidInput,
            message: "max_results must be greater than zero".to_string(),
        });
    }

    Ok(())
}

pub fn search_with_validation(
    service: &dyn SearchService,
    request: &SearchRequest,
) -> AdapterResult<ResultList> {
    let variant = service.descriptor().variant;
    ensure_searchable(service.descriptor(), request)?;
    service
        .search(request)
        .map_err(|error| error.attribute(Some(variant), Operation::Search))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::models::BackendVariant;
    use crate::registry::backend_descriptor;

    #[derive(Default)]
    struct CountingService {
        calls: AtomicUsize,
    }

    impl SearchService for CountingService {
        fn descriptor(&self) -> &BackendDescriptor {
            backend_descriptor(BackendVariant::ToolInvoke)
        }

        fn search(&self, _request: &SearchRequest) -> AdapterResult<ResultList> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CoreError::new(CoreErrorKind::Backend, "down"))
        }
    }

    #[test]
    fn blank_query_is_rejected_before_the_adapter_runs() {
        let service = CountingService::default();
        let error = search_with_validation(&service, &SearchRequest::new("\t", None)).unwrap_err();

        assert_eq!(error.kind, CoreErrorKind::InvalidInput);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn adapter_errors_are_attributed_to_the_backend() {
        let service = CountingService::default();
        let error = search_with_validation(&service, &SearchRequest::new("q", None)).unwrap_err();

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(error.backend, Some(BackendVariant::ToolInvoke));
        assert_eq!(error.operation, Some(Operation::Search));
    }
}
