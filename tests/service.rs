mod common;

use common::*;
use pdf_stamp::{
    hash_bytes, preview, AppState, FieldType, FieldUpdate, ImageData, JsonLinesAuditStore,
    Rect, ServiceConfig, SignRequest, SignService, StoreError,
};

#[test]
fn session_to_download() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServiceConfig::default();
    config
        .output_dir(dir.path().join("uploads"))
        .audit_log(dir.path().join("audit.jsonl"));
    let service = SignService::from_config(config);

    let mut state = AppState::new();
    state.open_document("lease.pdf", letter_pdf(2)).unwrap();
    state.set_viewport(preview::Viewport::new(612.0, 792.0));

    let signature = state.add_field(FieldType::Signature).unwrap();
    state.next_page();
    let initials = state.add_field(FieldType::Text).unwrap();
    state.update_field(
        initials,
        FieldUpdate {
            text: Some("J.D.".into()),
            ..Default::default()
        },
    );

    // drag the text field to the top-left corner of the preview
    let field = state.fields().get(initials).unwrap().clone();
    let moved = preview::field_box(&field.rect, state.viewport()).unwrap();
    let target = Rect::new(0.0, 0.0, moved.width, moved.height);
    let rect = preview::resize_to_percent(target, state.viewport()).unwrap();
    state.update_field(
        initials,
        FieldUpdate {
            x: Some(rect.x),
            y: Some(rect.y),
            ..Default::default()
        },
    );

    state.begin_signature(signature);
    state.save_signature(ImageData::png(png_signature(200, 60)));

    let request = state.to_request().unwrap();
    let source_hash = hash_bytes(&request.source);
    let response = service.sign(request).unwrap();
    assert!(response.report.is_clean());
    assert_eq!(response.report.fields_drawn, 2);
    assert_eq!(response.audit.source_hash, source_hash);
    assert_eq!(response.audit.note, None);

    let download = service.download(response.output_id.as_str()).unwrap();
    assert_eq!(download.content_type, "application/pdf");
    assert_eq!(hash_bytes(&download.bytes), response.audit.output_hash);
    assert_eq!(page_count(&download.bytes), 2);
    assert!(page_content(&download.bytes, 1).contains(" Do"));
    // 2pt in from the left edge, 12pt below the top of the page
    assert!(page_content(&download.bytes, 2).contains("2 780 Td"));

    let records = JsonLinesAuditStore::new(dir.path().join("audit.jsonl"))
        .read_all()
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source_file_name, "lease.pdf");
    assert_eq!(records[0].signature_count, 1);
    assert!(dir
        .path()
        .join("uploads")
        .join(response.output_id.as_str())
        .exists());
}

#[test]
fn form_request_with_client_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServiceConfig::default();
    config.output_dir(dir.path());
    let service = SignService::from_config(config);

    let fields = r#"[
        {"id": 1717171717171, "type": "text", "page": 1, "x": 10, "y": 10,
         "width": 30, "height": 5, "text": "Jane Doe", "imageData": null},
        {"id": 1717171717172, "type": "radio", "page": 1, "x": 50, "y": 50,
         "width": 3, "height": 3, "checked": true, "imageData": null},
        {"id": 1717171717173, "type": "checkbox", "page": 9, "x": 50, "y": 50,
         "width": 3, "height": 3, "checked": true}
    ]"#;
    let request = SignRequest::from_form(
        letter_pdf(1),
        "form.pdf",
        Some(fields),
        Some(r#"{"width": 900, "height": 1165}"#),
    )
    .unwrap();
    let response = service.sign(request).unwrap();
    assert_eq!(response.report.fields_drawn, 2);
    assert_eq!(response.report.skipped.len(), 1);
    assert!(response
        .audit
        .note
        .as_deref()
        .unwrap()
        .contains("no audit store"));

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(
        json["signedPdfUrl"],
        format!("/api/download/{}", response.output_id)
    );
}

#[test]
fn missing_download() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServiceConfig::default();
    config.output_dir(dir.path());
    let service = SignService::from_config(config);
    assert!(matches!(
        service.download("signed_0.pdf"),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        service.download("../Cargo.toml"),
        Err(StoreError::NotFound(_))
    ));
}
