use chrono::NaiveDate;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use atelier_couture::models::{
    AppointmentStatus, AppointmentUpdate, CollectionUpdate, ImageCategory, ImageUpload,
    ModerationStatus, NewAppointment, NewCollection, NewTestimonial, ServiceKind,
};
use atelier_couture::{Atelier, AtelierConfig, AtelierError};

fn atelier(server: &MockServer) -> Atelier {
    Atelier::new(AtelierConfig::new(&server.uri(), "anon-key").unwrap())
}

fn appointment_row(id: &str, time: &str, status: &str) -> Value {
    json!({
        "id": id,
        "client_name": "Léa Dubois",
        "client_email": "lea@example.com",
        "client_phone": "0612345678",
        "appointment_date": "2025-06-20",
        "appointment_time": time,
        "service": "fitting",
        "status": status,
        "notes": null,
        "created_at": "2025-06-01T08:00:00+00:00",
        "updated_at": "2025-06-01T08:00:00+00:00"
    })
}

fn new_appointment() -> NewAppointment {
    NewAppointment {
        client_name: "Léa Dubois".to_string(),
        client_email: "lea@example.com".to_string(),
        client_phone: "0612345678".to_string(),
        appointment_date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
        appointment_time: "10:00".parse().unwrap(),
        service: ServiceKind::Fitting,
        notes: None,
    }
}

fn count_response(total: u64) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Range", format!("*/{}", total).as_str())
        .set_body_json(json!([]))
}

/// 24-byte PNG header with the given dimensions
fn png(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0, 0, 0, 0, 0]);
    data
}

#[tokio::test]
async fn test_create_appointment_is_scheduled() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({
            "client_name": "Léa Dubois",
            "appointment_date": "2025-06-20",
            "appointment_time": "10:00",
            "service": "fitting",
            "status": "scheduled"
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([appointment_row("a1", "10:00:00", "scheduled")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let appointment = atelier(&server)
        .appointments()
        .create(&new_appointment())
        .await
        .unwrap();

    assert_eq!(appointment.id, "a1");
    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.appointment_time.to_string(), "10:00");
}

#[tokio::test]
async fn test_unique_violation_means_slot_taken() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"appointments_slot_key\"",
            "details": null,
            "hint": null
        })))
        .mount(&server)
        .await;

    let err = atelier(&server)
        .appointments()
        .create(&new_appointment())
        .await
        .unwrap_err();

    assert!(matches!(err, AtelierError::SlotUnavailable { .. }));
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_list_for_date_filters_active_statuses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("appointment_date", "eq.2025-06-20"))
        .and(query_param("status", "in.(scheduled,confirmed)"))
        .and(query_param("order", "appointment_time.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row("a1", "10:00:00", "confirmed"),
            appointment_row("a2", "14:30:00", "scheduled")
        ])))
        .mount(&server)
        .await;

    let date = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
    let appointments = atelier(&server)
        .appointments()
        .list_for_date(date)
        .await
        .unwrap();

    assert_eq!(appointments.len(), 2);
    assert_eq!(appointments[0].status, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn test_malformed_row_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([appointment_row("a1", "10:00", "archived")])),
        )
        .mount(&server)
        .await;

    let err = atelier(&server).appointments().list().await.unwrap_err();
    assert!(matches!(err, AtelierError::Mapping { .. }));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_status_change_follows_lifecycle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.a1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([appointment_row("a1", "10:00", "completed")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = atelier(&server)
        .appointments()
        .update_status("a1", AppointmentStatus::Scheduled)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AtelierError::InvalidTransition {
            from: AppointmentStatus::Completed,
            to: AppointmentStatus::Scheduled
        }
    ));
}

#[tokio::test]
async fn test_confirm_appointment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.a1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([appointment_row("a1", "10:00", "scheduled")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.a1"))
        .and(body_partial_json(json!({ "status": "confirmed" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([appointment_row("a1", "10:00", "confirmed")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let updated = atelier(&server)
        .appointments()
        .update_status("a1", AppointmentStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(updated.status, AppointmentStatus::Confirmed);
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 12).unwrap()
}

async fn mount_a1_and_day(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.a1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([appointment_row("a1", "10:00", "scheduled")])),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("appointment_date", "eq.2025-06-20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            appointment_row("a1", "10:00:00", "scheduled"),
            appointment_row("a2", "11:00:00", "confirmed")
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_update_rejects_closed_slot_and_past_date() {
    let server = MockServer::start().await;

    Mock::given(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = atelier(&server)
        .appointments()
        .update(
            "a1",
            &AppointmentUpdate {
                appointment_date: NaiveDate::from_ymd_opt(2025, 6, 1),
                appointment_time: Some("12:00".parse().unwrap()),
                ..Default::default()
            },
            today(),
        )
        .await
        .unwrap_err();

    let fields = err.field_errors().unwrap();
    assert_eq!(
        fields.get("appointment_date"),
        Some("La date ne peut pas être dans le passé")
    );
    assert_eq!(
        fields.get("appointment_time"),
        Some("Ce créneau ne fait pas partie des horaires d'ouverture")
    );
}

#[tokio::test]
async fn test_update_into_taken_slot() {
    let server = MockServer::start().await;
    mount_a1_and_day(&server).await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = atelier(&server)
        .appointments()
        .update(
            "a1",
            &AppointmentUpdate {
                appointment_time: Some("11:00".parse().unwrap()),
                ..Default::default()
            },
            today(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AtelierError::SlotUnavailable { .. }));
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_update_into_free_slot() {
    let server = MockServer::start().await;
    mount_a1_and_day(&server).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.a1"))
        .and(body_partial_json(json!({ "appointment_time": "14:00" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([appointment_row("a1", "14:00:00", "scheduled")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let updated = atelier(&server)
        .appointments()
        .update(
            "a1",
            &AppointmentUpdate {
                appointment_time: Some("14:00".parse().unwrap()),
                ..Default::default()
            },
            today(),
        )
        .await
        .unwrap();
    assert_eq!(updated.appointment_time.to_string(), "14:00");
}

#[tokio::test]
async fn test_delete_missing_appointment() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.nope"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = atelier(&server)
        .appointments()
        .delete("nope")
        .await
        .unwrap_err();
    assert!(matches!(err, AtelierError::NotFound { entity: "appointment", .. }));
}

#[tokio::test]
async fn test_testimonial_submitted_anonymously_while_signed_in() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "admin-token",
            "refresh_token": "refresh",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": { "id": "admin", "email": "admin@atelier.example" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/testimonials"))
        .and(header("Authorization", "Bearer anon-key"))
        .and(body_partial_json(json!({
            "name": "Amira",
            "testimonial": "Une robe sublime, merci pour tout.",
            "status": "pending"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "t1",
            "name": "Amira",
            "testimonial": "Une robe sublime, merci pour tout.",
            "status": "pending",
            "created_at": "2025-06-01T10:00:00Z",
            "updated_at": "2025-06-01T10:00:00Z"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let atelier = atelier(&server);
    atelier
        .sign_in("admin@atelier.example", "secret")
        .await
        .unwrap();

    let testimonial = atelier
        .testimonials()
        .submit(&NewTestimonial {
            name: "Amira".to_string(),
            quote: "Une robe sublime, merci pour tout.".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(testimonial.status, ModerationStatus::Pending);
    assert!(testimonial.reviewed_at.is_none());
    assert!(atelier.require_admin().is_ok());
}

#[tokio::test]
async fn test_testimonial_rls_violation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/testimonials"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "42501",
            "message": "new row violates row-level security policy for table \"testimonials\""
        })))
        .mount(&server)
        .await;

    let err = atelier(&server)
        .testimonials()
        .submit(&NewTestimonial {
            name: "Amira".to_string(),
            quote: "Une robe sublime, merci pour tout.".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 403);
    assert!(err.user_message().starts_with("Erreur de sécurité"));
    assert!(err.to_string().starts_with("RLS policy violation"));
}

#[tokio::test]
async fn test_moderation() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/testimonials"))
        .and(query_param("id", "eq.t1"))
        .and(body_partial_json(json!({ "status": "approved" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "t1",
            "name": "Amira",
            "testimonial": "Une robe sublime, merci pour tout.",
            "status": "approved",
            "created_at": "2025-06-01T10:00:00Z",
            "updated_at": "2025-06-03T09:00:00Z"
        }])))
        .mount(&server)
        .await;

    let testimonial = atelier(&server)
        .testimonials()
        .moderate("t1", ModerationStatus::Approved)
        .await
        .unwrap();
    assert_eq!(testimonial.status, ModerationStatus::Approved);
    assert!(testimonial.reviewed_at.is_some());
}

#[tokio::test]
async fn test_gallery_rejects_non_images_without_uploading() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let upload = ImageUpload {
        original_name: "devis.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        alt: None,
        category: ImageCategory::Collection,
        tags: vec![],
        uploaded_by: "admin".to_string(),
    };
    let err = atelier(&server)
        .gallery()
        .upload(b"%PDF-1.7".to_vec(), &upload)
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "devis.pdf n'est pas une image valide");
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_gallery_upload_records_dimensions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex_storage())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "gallery/x.png" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/gallery_images"))
        .and(body_partial_json(json!({
            "original_name": "robe-sirene.png",
            "alt": "robe-sirene",
            "category": "collection",
            "width": 640,
            "height": 480,
            "size": 33
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "img1",
            "filename": "0b7c.png",
            "original_name": "robe-sirene.png",
            "url": "http://localhost/storage/v1/object/public/gallery/0b7c.png",
            "alt": "robe-sirene",
            "category": "collection",
            "tags": ["sirène"],
            "uploaded_at": "2025-06-01T10:00:00Z",
            "uploaded_by": "admin",
            "size": 33,
            "width": 640,
            "height": 480
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let upload = ImageUpload {
        original_name: "robe-sirene.png".to_string(),
        content_type: "image/png".to_string(),
        alt: None,
        category: ImageCategory::Collection,
        tags: vec!["sirène".to_string()],
        uploaded_by: "admin".to_string(),
    };
    let image = atelier(&server)
        .gallery()
        .upload(png(640, 480), &upload)
        .await
        .unwrap();

    assert_eq!(image.dimensions.width, 640);
    assert_eq!(image.dimensions.height, 480);
    assert_eq!(image.size, 33);
}

fn path_regex_storage() -> wiremock::matchers::PathRegexMatcher {
    wiremock::matchers::path_regex(r"^/storage/v1/object/gallery/[0-9a-f-]{36}\.png$")
}

#[tokio::test]
async fn test_failed_insert_removes_uploaded_object() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex_storage())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "gallery/x.png" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/gallery_images"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "23502",
            "message": "null value in column \"url\""
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/storage/v1/object/gallery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let upload = ImageUpload {
        original_name: "atelier.png".to_string(),
        content_type: "image/png".to_string(),
        alt: Some("L'atelier".to_string()),
        category: ImageCategory::Atelier,
        tags: vec![],
        uploaded_by: "admin".to_string(),
    };
    let err = atelier(&server)
        .gallery()
        .upload(png(10, 10), &upload)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(
        err.user_message(),
        "Données manquantes. Veuillez remplir tous les champs requis."
    );
}

#[tokio::test]
async fn test_collection_requires_name() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = atelier(&server)
        .collections()
        .create(&NewCollection {
            name: "  ".to_string(),
            description: "Robes fluides pour cérémonies en plein air".to_string(),
            cover_image: String::new(),
            images: vec![],
            is_active: true,
        })
        .await
        .unwrap_err();

    let fields = err.field_errors().unwrap();
    assert!(fields.get("name").is_some());
    assert!(fields.get("description").is_none());
}

fn collection_row(id: &str, name: &str, active: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "Robes fluides pour cérémonies en plein air",
        "cover_image": null,
        "images": ["https://cdn.example/c1.jpg"],
        "is_active": active,
        "created_at": "2025-05-01T10:00:00+00:00",
        "updated_at": "2025-05-01T10:00:00+00:00"
    })
}

#[tokio::test]
async fn test_collections_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/collections"))
        .and(query_param("is_active", "eq.true"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([collection_row("c1", "Bohème", true)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/collections"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            collection_row("c2", "Sirène", false),
            collection_row("c1", "Bohème", true)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let atelier = atelier(&server);

    let active = atelier.collections().list_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "Bohème");
    assert_eq!(active[0].cover_image, "");

    let all = atelier.collections().list().await.unwrap();
    let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Sirène", "Bohème"]);
    assert!(!all[0].is_active);
}

#[tokio::test]
async fn test_collection_get_update_delete() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/collections"))
        .and(query_param("id", "eq.c1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([collection_row("c1", "Bohème", true)])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/collections"))
        .and(query_param("id", "eq.missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/collections"))
        .and(query_param("id", "eq.c1"))
        .and(body_partial_json(json!({ "name": "Bohème chic", "is_active": false })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([collection_row("c1", "Bohème chic", false)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/collections"))
        .and(query_param("id", "eq.c1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([collection_row("c1", "Bohème chic", false)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let collections = atelier(&server).collections().clone();

    let collection = collections.get("c1").await.unwrap();
    assert_eq!(collection.images, vec!["https://cdn.example/c1.jpg".to_string()]);

    let err = collections.get("missing").await.unwrap_err();
    assert!(matches!(err, AtelierError::NotFound { entity: "collection", .. }));

    let err = collections
        .update(
            "c1",
            &CollectionUpdate {
                description: Some(" ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.field_errors().and_then(|e| e.get("description")),
        Some("La description est requise")
    );

    let updated = collections
        .update(
            "c1",
            &CollectionUpdate {
                name: Some(" Bohème chic ".to_string()),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Bohème chic");
    assert!(!updated.is_active);

    collections.delete("c1").await.unwrap();
}

#[tokio::test]
async fn test_dashboard_stats() {
    let server = MockServer::start().await;

    // More specific count queries are mounted first.
    Mock::given(method("GET"))
        .and(path("/rest/v1/testimonials"))
        .and(query_param("status", "eq.pending"))
        .respond_with(count_response(2))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/testimonials"))
        .and(header("Prefer", "count=exact"))
        .respond_with(count_response(7))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("appointment_date", "gte.2025-06-10"))
        .and(query_param("status", "in.(scheduled,confirmed)"))
        .respond_with(count_response(3))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(header("Prefer", "count=exact"))
        .respond_with(count_response(11))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/gallery_images"))
        .and(query_param("select", "size"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "size": 1024 }, { "size": 512 }])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/gallery_images"))
        .and(header("Prefer", "count=exact"))
        .respond_with(count_response(2))
        .mount(&server)
        .await;

    let stats = atelier(&server)
        .dashboard()
        .stats(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap())
        .await
        .unwrap();

    assert_eq!(stats.total_testimonials, 7);
    assert_eq!(stats.pending_testimonials, 2);
    assert_eq!(stats.total_appointments, 11);
    assert_eq!(stats.upcoming_appointments, 3);
    assert_eq!(stats.total_images, 2);
    assert_eq!(stats.storage_used, 1536);
    assert_eq!(atelier_couture::cms::format_file_size(stats.storage_used), "1.5 KB");
}

#[tokio::test]
async fn test_admin_operations_need_a_session() {
    let server = MockServer::start().await;
    let err = atelier(&server).require_admin().unwrap_err();
    assert!(matches!(err, AtelierError::Unauthorized));
    assert_eq!(err.status_code(), 401);
}
