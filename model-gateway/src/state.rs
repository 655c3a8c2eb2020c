use std::sync::Arc;

use crate::{
    compare::MetadataComparator, config::GatewayConfig, demo::DemoUrlResolver,
    inference::InferenceDispatcher, upstream::UpstreamHandle,
};

type DispatcherHandle = Arc<InferenceDispatcher>;
type ComparatorHandle = Arc<MetadataComparator>;
type ResolverHandle = Arc<DemoUrlResolver>;

/// Shared handler state. The components hold no per-request state, so clones are cheap handles
/// onto the same instances.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: DispatcherHandle,
    pub comparator: ComparatorHandle,
    pub resolver: ResolverHandle,
}

impl AppState {
    pub fn new(config: GatewayConfig, upstream: UpstreamHandle) -> Self {
        let GatewayConfig {
            credentials,
            endpoints,
        } = config;

        Self {
            dispatcher: Arc::new(InferenceDispatcher::new(
                credentials.clone(),
                endpoints.clone(),
                Arc::clone(&upstream),
            )),
            comparator: Arc::new(MetadataComparator::new(
                credentials.clone(),
                endpoints.clone(),
                Arc::clone(&upstream),
            )),
            resolver: Arc::new(DemoUrlResolver::new(credentials, endpoints, upstream)),
        }
    }
}
