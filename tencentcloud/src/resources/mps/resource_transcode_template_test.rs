#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::api::test_helpers::{
        client_capabilities, create_test_provider_data, object_value, ok_body,
    };
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    fn video_template() -> Dynamic {
        Dynamic::List(vec![attrs::object(vec![
            ("codec", "libx264".into()),
            ("fps", 26.0.into()),
            ("bitrate", 1000.0.into()),
            ("resolution_adaptive", "open".into()),
            ("width", 0.0.into()),
            ("height", 0.0.into()),
            ("gop", Dynamic::Null),
            ("fill_type", "stretch".into()),
        ])])
    }

    fn config() -> DynamicValue {
        object_value(vec![
            ("container", "mp4".into()),
            ("name", "tf_transcode_template".into()),
            ("comment", Dynamic::Null),
            ("remove_video", false.into()),
            ("remove_audio", Dynamic::Null),
            ("video_template", video_template()),
            ("audio_template", Dynamic::List(vec![])),
        ])
    }

    fn template_json(name: &str) -> serde_json::Value {
        json!({
            "Definition": "1008",
            "Container": "mp4",
            "Name": name,
            "RemoveVideo": 0,
            "VideoTemplate": {
                "Codec": "libx264",
                "Fps": 26,
                "Bitrate": 1000,
                "ResolutionAdaptive": "open",
                "Width": 0,
                "Height": 0,
                "FillType": "stretch"
            },
            "CreateTime": "2022-11-02T09:00:00Z"
        })
    }

    fn resource(server: &ServerGuard) -> TranscodeTemplateResource {
        let mut resource = TranscodeTemplateResource::new();
        resource.provider_data = Some(create_test_provider_data(&server.url()));
        resource
    }

    #[test]
    fn test_template_spec_maps_flags_to_integers() {
        let spec = template_spec(&config()).unwrap();
        assert_eq!(spec.container.as_deref(), Some("mp4"));
        assert_eq!(spec.remove_video, Some(0));
        assert_eq!(spec.remove_audio, None);
        let video = spec.video_template.unwrap();
        assert_eq!(video.fps, Some(26));
        assert_eq!(video.gop, None);
        assert!(spec.audio_template.is_none());
    }

    #[tokio::test]
    async fn test_validate_rejects_unknown_container() {
        let mut config = config();
        config.set(&AttributePath::new("container"), "avi").unwrap();

        let response = TranscodeTemplateResource::new()
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "tencentcloud_mps_transcode_template".to_string(),
                    config,
                    client_capabilities: client_capabilities(),
                },
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("POST", "/")
            .match_header("x-tc-action", "CreateTranscodeTemplate")
            .match_body(Matcher::PartialJson(json!({
                "Container": "mp4",
                "Name": "tf_transcode_template",
                "RemoveVideo": 0,
                "VideoTemplate": {"Codec": "libx264", "Fps": 26, "Bitrate": 1000}
            })))
            .with_body(ok_body(json!({"Definition": 1008})))
            .expect(1)
            .create_async()
            .await;
        let describe = server
            .mock("POST", "/")
            .match_header("x-tc-action", "DescribeTranscodeTemplates")
            .match_body(Matcher::PartialJson(json!({"Definitions": [1008]})))
            .with_body(ok_body(json!({
                "TranscodeTemplateSet": [template_json("tf_transcode_template")]
            })))
            .expect(2)
            .create_async()
            .await;

        let resource = resource(&server);
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: resource.type_name().to_string(),
                    planned_state: config(),
                    config: config(),
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;

        create.assert_async().await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.new_state;
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "1008");
        assert!(!state.get_bool(&AttributePath::new("remove_video")).unwrap());
        assert_eq!(
            state.get(&AttributePath::new("video_template")),
            Some(&video_template())
        );

        let read = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: resource.type_name().to_string(),
                    current_state: state.clone(),
                    private: vec![],
                    provider_meta: None,
                    client_capabilities: client_capabilities(),
                    current_identity: None,
                },
            )
            .await;
        assert_eq!(read.new_state.unwrap(), state);
        describe.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_sends_only_changed_fields() {
        let mut server = Server::new_async().await;
        let modify = server
            .mock("POST", "/")
            .match_header("x-tc-action", "ModifyTranscodeTemplate")
            .match_body(Matcher::Json(json!({
                "Definition": 1008,
                "Name": "renamed"
            })))
            .with_body(ok_body(json!({})))
            .expect(1)
            .create_async()
            .await;
        let _describe = server
            .mock("POST", "/")
            .match_header("x-tc-action", "DescribeTranscodeTemplates")
            .with_body(ok_body(json!({
                "TranscodeTemplateSet": [template_json("renamed")]
            })))
            .create_async()
            .await;

        let mut prior = config();
        prior.set(&AttributePath::new("id"), "1008").unwrap();
        let mut planned = config();
        planned.set(&AttributePath::new("name"), "renamed").unwrap();

        let resource = resource(&server);
        let response = resource
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: resource.type_name().to_string(),
                    prior_state: prior,
                    planned_state: planned.clone(),
                    config: planned,
                    planned_private: vec![],
                    provider_meta: None,
                    planned_identity: None,
                },
            )
            .await;

        modify.assert_async().await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(
            response.new_state.get_string(&AttributePath::new("name")).unwrap(),
            "renamed"
        );
    }

    async fn update(
        resource: &TranscodeTemplateResource,
        prior: DynamicValue,
        planned: DynamicValue,
    ) -> UpdateResourceResponse {
        resource
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: resource.type_name().to_string(),
                    prior_state: prior,
                    planned_state: planned.clone(),
                    config: planned,
                    planned_private: vec![],
                    provider_meta: None,
                    planned_identity: None,
                },
            )
            .await
    }

    #[tokio::test]
    async fn test_update_clears_removed_comment() {
        let mut server = Server::new_async().await;
        let modify = server
            .mock("POST", "/")
            .match_header("x-tc-action", "ModifyTranscodeTemplate")
            .match_body(Matcher::Json(json!({"Definition": 1008, "Comment": ""})))
            .with_body(ok_body(json!({})))
            .expect(1)
            .create_async()
            .await;
        let _describe = server
            .mock("POST", "/")
            .match_header("x-tc-action", "DescribeTranscodeTemplates")
            .with_body(ok_body(json!({
                "TranscodeTemplateSet": [template_json("tf_transcode_template")]
            })))
            .create_async()
            .await;

        let mut prior = config();
        prior.set(&AttributePath::new("id"), "1008").unwrap();
        prior.set(&AttributePath::new("comment"), "old").unwrap();
        let mut planned = prior.clone();
        planned.set(&AttributePath::new("comment"), Dynamic::Null).unwrap();

        let response = update(&resource(&server), prior, planned).await;

        modify.assert_async().await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert!(response
            .new_state
            .get_string_opt(&AttributePath::new("comment"))
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_resends_changed_video_block_whole() {
        let mut server = Server::new_async().await;
        let modify = server
            .mock("POST", "/")
            .match_header("x-tc-action", "ModifyTranscodeTemplate")
            .match_body(Matcher::Json(json!({
                "Definition": 1008,
                "VideoTemplate": {
                    "Codec": "libx264",
                    "Fps": 30,
                    "Bitrate": 1000,
                    "ResolutionAdaptive": "open",
                    "Width": 0,
                    "Height": 0,
                    "FillType": "stretch"
                }
            })))
            .with_body(ok_body(json!({})))
            .expect(1)
            .create_async()
            .await;
        let _describe = server
            .mock("POST", "/")
            .match_header("x-tc-action", "DescribeTranscodeTemplates")
            .with_body(ok_body(json!({
                "TranscodeTemplateSet": [template_json("tf_transcode_template")]
            })))
            .create_async()
            .await;

        let mut prior = config();
        prior.set(&AttributePath::new("id"), "1008").unwrap();
        let mut planned = prior.clone();
        planned
            .set(&AttributePath::new("video_template").index(0).attribute("fps"), 30.0)
            .unwrap();

        let response = update(&resource(&server), prior, planned).await;

        modify.assert_async().await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    }

    #[tokio::test]
    async fn test_update_without_changes_skips_modify() {
        let mut server = Server::new_async().await;
        let modify = server
            .mock("POST", "/")
            .match_header("x-tc-action", "ModifyTranscodeTemplate")
            .expect(0)
            .create_async()
            .await;
        let _describe = server
            .mock("POST", "/")
            .match_header("x-tc-action", "DescribeTranscodeTemplates")
            .with_body(ok_body(json!({
                "TranscodeTemplateSet": [template_json("tf_transcode_template")]
            })))
            .create_async()
            .await;

        let mut prior = config();
        prior.set(&AttributePath::new("id"), "1008").unwrap();

        let response = update(&resource(&server), prior.clone(), prior).await;

        modify.assert_async().await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    }

    #[tokio::test]
    async fn test_delete_by_definition() {
        let mut server = Server::new_async().await;
        let delete = server
            .mock("POST", "/")
            .match_header("x-tc-action", "DeleteTranscodeTemplate")
            .match_body(Matcher::Json(json!({"Definition": 1008})))
            .with_body(ok_body(json!({})))
            .expect(1)
            .create_async()
            .await;

        let mut state = config();
        state.set(&AttributePath::new("id"), "1008").unwrap();

        let response = resource(&server)
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "tencentcloud_mps_transcode_template".to_string(),
                    prior_state: state,
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;

        delete.assert_async().await;
        assert!(response.diagnostics.is_empty());
    }
}
