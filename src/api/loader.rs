use futures::future;
use tracing::debug;

use crate::api::session::{SessionResolver, ViewSession};
use crate::error::AtlasError;
use crate::geo::GeographyModel;
use crate::source::{DatasetSource, TopologySource};

/// Fetches both inputs concurrently and writes each into the session as
/// soon as it completes.
///
/// Results arriving after the session was dropped are discarded.
pub async fn load_session<T, D>(resolver: SessionResolver, topology: &T, dataset: &D)
where
    T: TopologySource,
    D: DatasetSource,
{
    let geography = async {
        let result = topology.fetch_topology().await.and_then(|topology_doc| {
            GeographyModel::from_topology(&topology_doc)
                .map_err(|err| AtlasError::source_fetch(topology.name(), err))
        });
        resolver.resolve_geography(result);
    };
    let records = async {
        let result = dataset.fetch_dataset().await;
        resolver.resolve_dataset(result);
    };
    future::join(geography, records).await;
    debug!(
        topology = topology.name(),
        dataset = dataset.name(),
        detached = resolver.is_detached(),
        "session load finished"
    );
}

impl ViewSession {
    /// Starts loading both inputs; poll the returned future to drive it.
    pub fn load<'a, T, D>(
        &self,
        topology: &'a T,
        dataset: &'a D,
    ) -> impl Future<Output = ()> + use<'a, T, D>
    where
        T: TopologySource,
        D: DatasetSource,
    {
        load_session(self.resolver(), topology, dataset)
    }
}
