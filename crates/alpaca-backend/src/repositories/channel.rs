//! REST implementation of ChannelRepository

use async_trait::async_trait;
use tracing::instrument;

use alpaca_core::entities::{Channel, NewChannel};
use alpaca_core::traits::{ChannelRepository, RepoResult};

use crate::client::{first_row, Query, RestClient};

const TABLE: &str = "channels";

/// REST implementation of ChannelRepository
#[derive(Debug, Clone)]
pub struct RestChannelRepository {
    client: RestClient,
}

impl RestChannelRepository {
    /// Create a new RestChannelRepository
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChannelRepository for RestChannelRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<Channel>> {
        self.client.select(TABLE, &Query::new().select("*")).await
    }

    #[instrument(skip(self))]
    async fn create(&self, channel: &NewChannel) -> RepoResult<Channel> {
        let rows = self
            .client
            .insert_returning(TABLE, &[channel], &Query::new().select("*"))
            .await?;
        first_row(rows, "channel", &channel.name)
    }
}
