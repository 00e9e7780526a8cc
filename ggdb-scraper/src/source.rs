use crate::error::ApiError;

/// The single external lookup capability the enrichment pipeline needs.
///
/// `resource` is an IGDB endpoint name ("games", "game_time_to_beats") and
/// `body` an Apicalypse query. Implemented over HTTP by
/// [`IgdbClient`](crate::IgdbClient); tests substitute scripted sources.
pub trait MetadataSource {
    fn query(
        &self,
        resource: &str,
        body: &str,
    ) -> impl Future<Output = Result<Vec<serde_json::Value>, ApiError>>;
}
