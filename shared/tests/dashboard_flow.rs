use assert_matches::assert_matches;
use crux_core::testing::{AppTester, Update};
use crux_http::protocol::{HttpResponse, HttpResult};
use crux_http::HttpError;
use shared::filter::ComplaintFilterInput;
use shared::gateway::GatewayReply;
use shared::{App, Effect, Event, ListKind, Model};

fn complaints_json() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "1",
            "Patient_Name": "Ada",
            "Complaint_Type": "Billing",
            "Description": "Charged twice",
            "Date_Submitted": "2024-01-01",
            "Status": "Pending",
            "Admin_Comment": ""
        },
        {
            "id": "2",
            "Patient_Name": "A \"B\"",
            "Complaint_Type": "Service Delay",
            "Description": "Waited",
            "Date_Submitted": "2024-01-02",
            "Status": "Resolved",
            "Admin_Comment": "Apologised"
        }
    ])
}

fn complaints_reply() -> GatewayReply {
    GatewayReply::ok_json(&complaints_json())
}

fn loaded(app: &AppTester<App, Effect>) -> Model {
    let mut model = Model::default();
    app.update(Event::RefreshComplaints, &mut model);
    let generation = model.complaints.store().latest_generation();
    app.update(
        Event::ComplaintsFetched {
            generation,
            reply: complaints_reply(),
        },
        &mut model,
    );
    model
}

fn has_http(effects: &[Effect]) -> bool {
    effects.iter().any(|e| matches!(e, Effect::Http(_)))
}

/// Answers the first HTTP request in `update` the way a shell would and
/// feeds the resulting events back into the app.
fn resolve_http(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    mut update: Update<Effect, Event>,
    result: HttpResult,
) -> Vec<Effect> {
    let request = update
        .effects_mut()
        .find_map(|e| match e {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .expect("an HTTP request");
    let resolved = app.resolve(request, result).expect("request resolves");
    let mut effects = resolved.effects;
    for event in resolved.events {
        effects.extend(app.update(event, model).effects);
    }
    effects
}

#[test]
fn test_startup_requests_session_and_complaints() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::AppStarted, &mut model);

    let urls: Vec<String> = update
        .effects
        .iter()
        .filter_map(|e| match e {
            Effect::Http(request) => Some(request.operation.url.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        urls,
        vec![
            "http://localhost:8000/api/admins/check-super",
            "http://localhost:8000/api/complaints"
        ]
    );
    assert!(update.effects.iter().any(|e| matches!(e, Effect::KeyValue(_))));
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));
    assert!(model.complaints.store().is_loading());
}

#[test]
fn test_requests_carry_request_id() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::RefreshComplaints, &mut model);
    let request = update
        .effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .unwrap();
    assert_eq!(request.operation.method, "GET");
    assert!(request
        .operation
        .headers
        .iter()
        .any(|h| h.name.eq_ignore_ascii_case("x-request-id") && h.value.len() == 36));
}

#[test]
fn test_two_record_scenario() {
    let app = AppTester::<App, Effect>::default();
    let model = loaded(&app);

    let view = app.view(&model);
    assert_eq!(view.complaints.results_count, 2);
    assert_eq!(view.complaints.pager.info, "Page 1 of 1");
    let ids: Vec<_> = view.complaints.rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1"]);
    assert_eq!(view.complaints.rows[1].admin_comment, "None");
    assert_eq!(view.complaints.rows[0].patient_name, "A &quot;B&quot;");

    assert_eq!(view.metrics.total_complaints, 2);
    assert_eq!(view.metrics.pending, 1);
    assert_eq!(view.metrics.resolved, 1);
    assert_eq!(view.metrics.urgent, 1);
    assert_eq!(view.metrics.needs_comment, 1);
}

#[test]
fn test_stale_fetch_is_discarded() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::RefreshComplaints, &mut model);
    let older = model.complaints.store().latest_generation();
    app.update(Event::RefreshComplaints, &mut model);
    let newer = model.complaints.store().latest_generation();

    app.update(
        Event::ComplaintsFetched {
            generation: newer,
            reply: complaints_reply(),
        },
        &mut model,
    );
    app.update(
        Event::ComplaintsFetched {
            generation: older,
            reply: GatewayReply::ok_json(&serde_json::json!([])),
        },
        &mut model,
    );

    assert_eq!(model.complaints.store().records().len(), 2);
    assert!(!model.complaints.store().is_loading());
}

#[test]
fn test_filters_apply_and_clear() {
    let app = AppTester::<App, Effect>::default();
    let mut model = loaded(&app);

    app.update(
        Event::ComplaintFilterChanged(ComplaintFilterInput {
            status: "Resolved".into(),
            ..ComplaintFilterInput::default()
        }),
        &mut model,
    );
    let view = app.view(&model);
    assert_eq!(view.complaints.results_count, 1);
    assert_eq!(view.complaints.rows[0].id, "2");
    assert!(view.complaints.filtered);
    // Metrics ignore the filter.
    assert_eq!(view.metrics.total_complaints, 2);

    app.update(
        Event::ComplaintFilterChanged(ComplaintFilterInput {
            date_from: "2024-01-02".into(),
            date_to: "2024-01-02".into(),
            ..ComplaintFilterInput::default()
        }),
        &mut model,
    );
    let ids: Vec<_> = app
        .view(&model)
        .complaints
        .rows
        .iter()
        .map(|r| r.id.clone())
        .collect();
    assert_eq!(ids, vec!["2"]);

    app.update(Event::ComplaintFiltersCleared, &mut model);
    assert_eq!(app.view(&model).complaints.results_count, 2);
}

#[test]
fn test_bad_filter_date_keeps_criteria() {
    let app = AppTester::<App, Effect>::default();
    let mut model = loaded(&app);

    app.update(
        Event::ComplaintFilterChanged(ComplaintFilterInput {
            date_from: "Jan 2".into(),
            ..ComplaintFilterInput::default()
        }),
        &mut model,
    );
    let view = app.view(&model);
    assert_eq!(view.complaints.results_count, 2);
    assert_matches!(view.alert, Some(alert) if alert.code.as_deref() == Some("VALIDATION_ERROR"));
}

#[test]
fn test_criteria_survive_reload() {
    let app = AppTester::<App, Effect>::default();
    let mut model = loaded(&app);

    app.update(
        Event::ComplaintFilterChanged(ComplaintFilterInput {
            patient_name: "ada".into(),
            ..ComplaintFilterInput::default()
        }),
        &mut model,
    );
    app.update(Event::RefreshComplaints, &mut model);
    let generation = model.complaints.store().latest_generation();
    app.update(
        Event::ComplaintsFetched {
            generation,
            reply: complaints_reply(),
        },
        &mut model,
    );
    assert_eq!(app.view(&model).complaints.results_count, 1);
}

#[test]
fn test_paging_events() {
    let app = AppTester::<App, Effect>::default();
    let mut model = loaded(&app);

    app.update(
        Event::PageSizeChanged {
            list: ListKind::Complaints,
            page_size: 1,
        },
        &mut model,
    );
    let view = app.view(&model);
    assert_eq!(view.complaints.pager.info, "Page 1 of 2");
    assert!(view.complaints.pager.has_next);

    app.update(
        Event::NextPage {
            list: ListKind::Complaints,
        },
        &mut model,
    );
    app.update(
        Event::NextPage {
            list: ListKind::Complaints,
        },
        &mut model,
    );
    let view = app.view(&model);
    assert_eq!(view.complaints.pager.page, 2);
    assert_eq!(view.complaints.rows[0].id, "1");

    app.update(
        Event::PageSizeChanged {
            list: ListKind::Complaints,
            page_size: 0,
        },
        &mut model,
    );
    assert_eq!(model.complaints.page_size(), 1);
    assert!(model.alert.is_some());
}

#[test]
fn test_failed_fetch_alerts_and_keeps_records() {
    let app = AppTester::<App, Effect>::default();
    let mut model = loaded(&app);

    app.update(Event::RefreshComplaints, &mut model);
    let generation = model.complaints.store().latest_generation();
    app.update(
        Event::ComplaintsFetched {
            generation,
            reply: GatewayReply::Transport {
                message: "connection reset".into(),
            },
        },
        &mut model,
    );

    assert_eq!(model.complaints.store().records().len(), 2);
    let alert = app.view(&model).alert.unwrap();
    assert_eq!(alert.code.as_deref(), Some("NETWORK_ERROR"));
    assert!(!alert.message.contains("connection reset"));
}

#[test]
fn test_list_fetch_resolved_over_http() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::RefreshComplaints, &mut model);
    let response = HttpResponse::ok().json(complaints_json()).build();
    resolve_http(&app, &mut model, update, HttpResult::Ok(response));

    let view = app.view(&model);
    assert!(!view.complaints.loading);
    assert!(view.complaints.loaded);
    assert_eq!(view.complaints.results_count, 2);
    assert_eq!(view.complaints.rows[0].id, "2");
    assert!(view.alert.is_none());
}

#[test]
fn test_server_error_resolved_over_http_shows_detail() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::RefreshComplaints, &mut model);
    let response = HttpResponse::status(500)
        .json(serde_json::json!({"detail": "Database unavailable"}))
        .build();
    resolve_http(&app, &mut model, update, HttpResult::Ok(response));

    let alert = app.view(&model).alert.unwrap();
    assert_eq!(alert.message, "Database unavailable");
    assert_eq!(alert.code.as_deref(), Some("INTERNAL_ERROR"));
    assert!(!model.complaints.store().is_loading());
}

#[test]
fn test_io_error_resolved_over_http_is_network_error() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::RefreshComplaints, &mut model);
    let effects = resolve_http(
        &app,
        &mut model,
        update,
        HttpResult::Err(HttpError::Io("connection refused".into())),
    );

    assert!(!has_http(&effects));
    let alert = app.view(&model).alert.unwrap();
    assert_eq!(alert.code.as_deref(), Some("NETWORK_ERROR"));
    assert!(!alert.message.contains("connection refused"));
    assert!(!model.complaints.store().is_loading());
}

#[test]
fn test_export_scenario() {
    let app = AppTester::<App, Effect>::default();
    let mut model = loaded(&app);

    app.update(Event::ExportRequested, &mut model);
    let export = app.view(&model).export.unwrap();
    assert!(export.filename.starts_with("complaints-"));
    assert!(export.filename.ends_with(".csv"));
    assert!(export.contents.contains(r#""A ""B""""#));
}

#[test]
fn test_sidebar_toggle_persists() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::SidebarToggled, &mut model);
    assert!(model.sidebar_collapsed);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::KeyValue(_))));

    app.update(
        Event::SidebarStateLoaded {
            value: Some(b"false".to_vec()),
        },
        &mut model,
    );
    assert!(!model.sidebar_collapsed);

    app.update(
        Event::SidebarStateLoaded {
            value: Some(b"garbage".to_vec()),
        },
        &mut model,
    );
    assert!(!model.sidebar_collapsed);
}

#[test]
fn test_chat_complaint_round_trip() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(
        Event::ChatComplaintSubmitted {
            patient_name: "John Doe".into(),
            complaint_type: "Service Delay".into(),
            description: "   ".into(),
        },
        &mut model,
    );
    assert!(!has_http(&update.effects));

    let update = app.update(
        Event::ChatComplaintSubmitted {
            patient_name: "John Doe".into(),
            complaint_type: "Service Delay".into(),
            description: "Nobody answered the phone".into(),
        },
        &mut model,
    );
    assert!(has_http(&update.effects));

    let update = app.update(
        Event::ChatComplaintAcknowledged {
            reply: GatewayReply::ok_json(
                &serde_json::json!({"fulfillmentText": "Your complaint ID is CMP-4821."}),
            ),
        },
        &mut model,
    );
    assert!(has_http(&update.effects));
    assert_eq!(
        app.view(&model).alert.map(|a| a.message),
        Some("Your complaint ID is CMP-4821.".to_string())
    );
}
