//! Partitioning of the panel timeline into named shots.
//!
//! Each panel occupies the half-open interval
//! `[cumulative_duration_before, cumulative_duration_before + duration)` on
//! the timeline. A panel belongs to the marker with the greatest start not
//! exceeding the panel's interval start; panels before the first marker
//! belong to no shot.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use slate_client::SlateClient;
use slate_models::{MarkerTrack, Panel, RevisionedPanel, ShotGroup, ShotMedia, ShotMediaRef};

use crate::error::{ExportError, ExportResult};

/// Shot groups in order of first appearance on the timeline.
///
/// Groups are keyed by shot name: a later marker that repeats an earlier
/// name appends to the existing group. Shot names are assumed unique per
/// timeline; per-group panel order always follows timeline order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotAssignment {
    groups: Vec<ShotGroup>,
}

impl ShotAssignment {
    pub fn groups(&self) -> &[ShotGroup] {
        &self.groups
    }

    /// Look up a group by shot name.
    pub fn get(&self, shot_name: &str) -> Option<&ShotGroup> {
        self.groups.iter().find(|g| g.shot_name == shot_name)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

/// Assign panels to the shots delimited by `markers`.
///
/// The recorded `pos` of every formatted panel is its index in the original
/// full timeline, not its index within the shot group; the export API
/// requires the former.
pub fn assign_panels_to_markers(markers: &MarkerTrack, panels: &[Panel]) -> ShotAssignment {
    let mut groups: Vec<ShotGroup> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    let mut cumulative: u64 = 0;
    for (pos, panel) in panels.iter().enumerate() {
        if let Some(marker) = markers.shot_at(cumulative) {
            let index = *index_by_name.entry(marker.name.clone()).or_insert_with(|| {
                groups.push(ShotGroup::new(marker.name.clone()));
                groups.len() - 1
            });
            groups[index]
                .panels
                .push(RevisionedPanel::from_panel(panel, pos));
        }
        cumulative += panel.duration;
    }

    debug!(
        panels = panels.len(),
        shots = groups.len(),
        "Assigned panels to marker boundaries"
    );
    ShotAssignment { groups }
}

/// Resolve the artwork and thumbnail media objects already attached to every
/// panel's asset, per shot.
///
/// All-or-nothing: any failed lookup (a panel without an asset, a missing
/// asset, an asset without artwork or thumbnail renditions) abandons the
/// whole mapping, since a partially resolved shot is unusable downstream.
pub async fn resolve_shot_media(
    client: &SlateClient,
    assignment: &ShotAssignment,
) -> ExportResult<BTreeMap<String, ShotMedia>> {
    let mut media_per_shot = BTreeMap::new();

    for group in assignment.groups() {
        let mut media = ShotMedia::default();

        for panel in &group.panels {
            let asset_id = panel
                .asset
                .ok_or_else(|| ExportError::AssetResolutionFailed {
                    panel: panel.id,
                    reason: "panel references no asset".into(),
                })?
                .asset_id;

            let asset = client.get_asset(asset_id).await.map_err(|e| {
                ExportError::AssetResolutionFailed {
                    panel: panel.id,
                    reason: e.to_string(),
                }
            })?;

            let artwork =
                asset
                    .first_artwork()
                    .ok_or_else(|| ExportError::AssetResolutionFailed {
                        panel: panel.id,
                        reason: format!("asset {} has no artwork rendition", asset_id),
                    })?;
            let thumbnail =
                asset
                    .first_thumbnail()
                    .ok_or_else(|| ExportError::AssetResolutionFailed {
                        panel: panel.id,
                        reason: format!("asset {} has no thumbnail rendition", asset_id),
                    })?;

            media.artwork.push(ShotMediaRef {
                name: artwork.name.clone(),
                id: panel.id,
                revision_number: panel.revision_number,
                pos: panel.pos,
                mo: artwork.id,
            });
            media.thumbnails.push(ShotMediaRef {
                name: thumbnail.name.clone(),
                id: panel.id,
                revision_number: panel.revision_number,
                pos: panel.pos,
                mo: thumbnail.id,
            });
        }

        media_per_shot.insert(group.shot_name.clone(), media);
    }

    Ok(media_per_shot)
}


#[cfg(test)]
mod media_tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use slate_client::SlateConfig;
    use slate_models::{AssetId, Marker, MediaObjectId, PanelAsset, PanelId};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn authenticated_client(server: &MockServer) -> SlateClient {
        let expiry = (Utc::now() + chrono::Duration::hours(10))
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "test-key",
                "secret_access_key": "test-secret",
                "expiry_date": expiry,
            })))
            .mount(server)
            .await;

        let client = SlateClient::new(SlateConfig::new(server.uri())).unwrap();
        client.authenticate("user", "pass").await.unwrap();
        client
    }

    async fn mount_asset(server: &MockServer, asset: i64, artwork: i64, thumbnail: i64) {
        Mock::given(method("GET"))
            .and(path(format!("/asset/{}", asset)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "asset_id": asset,
                "media_objects": {
                    "artwork": [{"id": artwork, "name": format!("art_{}.psd", asset)}],
                    "thumbnail": [{"id": thumbnail, "name": format!("thumb_{}.png", asset)}]
                }
            })))
            .mount(server)
            .await;
    }

    fn panel_with_asset(id: i64, asset: i64) -> Panel {
        Panel {
            panel_id: PanelId(id),
            revision_number: 1,
            duration: 1,
            asset: Some(PanelAsset {
                asset_id: AssetId(asset),
            }),
            dialogue: None,
        }
    }

    #[tokio::test]
    async fn test_resolve_collects_first_renditions_per_panel() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;
        mount_asset(&server, 100, 900, 901).await;
        mount_asset(&server, 101, 910, 911).await;

        let markers = MarkerTrack::from_markers([Marker::new(0, "sh010")]);
        let panels = vec![panel_with_asset(1, 100), panel_with_asset(2, 101)];
        let assignment = assign_panels_to_markers(&markers, &panels);

        let media = resolve_shot_media(&client, &assignment).await.unwrap();
        let shot = media.get("sh010").unwrap();

        assert_eq!(shot.artwork.len(), 2);
        assert_eq!(shot.artwork[0].mo, MediaObjectId(900));
        assert_eq!(shot.artwork[0].id, PanelId(1));
        assert_eq!(shot.artwork[0].pos, 0);
        assert_eq!(shot.artwork[1].pos, 1);
        assert_eq!(shot.thumbnails[1].mo, MediaObjectId(911));
        assert_eq!(shot.thumbnails[1].name, "thumb_101.png");
    }

    #[tokio::test]
    async fn test_resolve_is_all_or_nothing() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;
        // Only the first panel's asset resolves; the second lookup 404s.
        mount_asset(&server, 100, 900, 901).await;

        let markers = MarkerTrack::from_markers([Marker::new(0, "sh010")]);
        let panels = vec![panel_with_asset(1, 100), panel_with_asset(2, 404)];
        let assignment = assign_panels_to_markers(&markers, &panels);

        let err = resolve_shot_media(&client, &assignment).await.unwrap_err();
        assert!(matches!(
            err,
            ExportError::AssetResolutionFailed {
                panel: PanelId(2),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_resolve_fails_on_panel_without_asset() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;

        let markers = MarkerTrack::from_markers([Marker::new(0, "sh010")]);
        let panels = vec![Panel {
            panel_id: PanelId(3),
            revision_number: 1,
            duration: 1,
            asset: None,
            dialogue: None,
        }];
        let assignment = assign_panels_to_markers(&markers, &panels);

        let err = resolve_shot_media(&client, &assignment).await.unwrap_err();
        assert!(matches!(
            err,
            ExportError::AssetResolutionFailed {
                panel: PanelId(3),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_resolve_fails_on_asset_without_artwork() {
        let server = MockServer::start().await;
        let client = authenticated_client(&server).await;
        Mock::given(method("GET"))
            .and(path("/asset/100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "asset_id": 100,
                "media_objects": {"artwork": [], "thumbnail": [{"id": 1, "name": "t.png"}]}
            })))
            .mount(&server)
            .await;

        let markers = MarkerTrack::from_markers([Marker::new(0, "sh010")]);
        let panels = vec![panel_with_asset(1, 100)];
        let assignment = assign_panels_to_markers(&markers, &panels);

        let err = resolve_shot_media(&client, &assignment).await.unwrap_err();
        assert!(matches!(err, ExportError::AssetResolutionFailed { .. }));
    }
}
