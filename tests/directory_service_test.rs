mod common;

use bson::oid::ObjectId;
use common::TestContext;
use woostaa_backend::dto::directory_dto::{ApartmentRequest, AvailableApartmentsQuery, WorkerRequest};
use woostaa_backend::dto::pagination::PageQuery;
use woostaa_backend::model::apartment::Apartment;
use woostaa_backend::model::catalog::ServiceKind;
use woostaa_backend::service::directory_service::DirectoryService;
use woostaa_backend::util::error::ServiceError;

fn apartment(name: &str, area: &str, pincode: &str) -> ApartmentRequest {
    ApartmentRequest {
        name: name.to_string(),
        area: area.to_string(),
        pincode: pincode.to_string(),
        total_units: 120,
        ..Default::default()
    }
}

fn worker(name: &str, phone: &str) -> WorkerRequest {
    WorkerRequest {
        name: name.to_string(),
        phone: phone.to_string(),
        ..Default::default()
    }
}

async fn seed_apartments(ctx: &TestContext) -> Vec<Apartment> {
    let directory = &ctx.services.directory_service;
    let mut created = Vec::new();
    for (name, area, pincode) in [
        ("Sobha Dream Acres", "Varthur", "560087"),
        ("Prestige Lakeside", "Whitefield", "560066"),
        ("Brigade Metropolis", "Whitefield", "560048"),
        ("Adarsh Palm Retreat", "Bellandur", "560103"),
    ] {
        created.push(directory.create_apartment(apartment(name, area, pincode)).await.unwrap());
    }
    created
}

#[tokio::test]
async fn test_pincode_must_be_six_digits() {
    let ctx = TestContext::new();
    let directory = &ctx.services.directory_service;

    for bad in ["56006", "5600661", "56O066", ""] {
        let err = directory.create_apartment(apartment("Tower", "Whitefield", bad)).await.unwrap_err();
        assert_eq!(err, ServiceError::InvalidInput("Pincode must be 6 digits".to_string()), "pincode {bad:?}");
    }
    assert!(ctx.apartments.apartments.lock().unwrap().is_empty());

    let created = directory.create_apartment(apartment(" Tower ", "Whitefield", " 560066 ")).await.unwrap();
    assert_eq!(created.name, "Tower");
    assert_eq!(created.pincode, "560066");
}

#[tokio::test]
async fn test_available_apartments_are_active_and_sorted() {
    let ctx = TestContext::new();
    let directory = &ctx.services.directory_service;
    let seeded = seed_apartments(&ctx).await;

    let mut inactive = apartment("Sobha Dream Acres", "Varthur", "560087");
    inactive.is_active = Some(false);
    directory.update_apartment(seeded[0].id.unwrap(), inactive).await.unwrap();

    let available = directory.available_apartments(AvailableApartmentsQuery::default()).await.unwrap();
    let names: Vec<&str> = available.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Adarsh Palm Retreat", "Brigade Metropolis", "Prestige Lakeside"]);

    let whitefield = directory
        .available_apartments(AvailableApartmentsQuery { area: Some("whitefield".into()), pincode: Some("560066".into()) })
        .await
        .unwrap();
    assert_eq!(whitefield.len(), 1);
    assert_eq!(whitefield[0].name, "Prestige Lakeside");
}

#[tokio::test]
async fn test_areas_and_pincodes() {
    let ctx = TestContext::new();
    let directory = &ctx.services.directory_service;
    seed_apartments(&ctx).await;

    assert_eq!(directory.areas().await.unwrap(), ["Bellandur", "Varthur", "Whitefield"]);
    assert_eq!(directory.pincodes(" Whitefield ").await.unwrap(), ["560048", "560066"]);
    assert!(directory.pincodes("Koramangala").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_apartment() {
    let ctx = TestContext::new();
    let directory = &ctx.services.directory_service;

    let err = directory.get_apartment(ObjectId::new()).await.unwrap_err();
    assert_eq!(err, ServiceError::NotFound("Apartment not found".to_string()));
    let err = directory
        .update_apartment(ObjectId::new(), apartment("Tower", "Whitefield", "560066"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert!(matches!(directory.delete_apartment(ObjectId::new()).await.unwrap_err(), ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_worker_references_are_expanded() {
    let ctx = TestContext::new();
    let directory = &ctx.services.directory_service;
    let apartments = seed_apartments(&ctx).await;
    let maid = ctx.add_service(ServiceKind::Maid, Some(200.0)).await;
    let apartment_id = apartments[1].id.unwrap().to_hex();

    let mut request = worker("Lakshmi", "9000000001");
    request.services = vec![maid.id.unwrap().to_hex()];
    // duplicates collapse
    request.areas = vec![apartment_id.clone(), apartment_id];
    let view = directory.create_worker(request).await.unwrap();

    assert_eq!(view.worker.areas.len(), 1);
    assert_eq!(view.service_details.len(), 1);
    assert_eq!(view.service_details[0].name, "Maid Service");
    assert_eq!(view.area_details.len(), 1);
    assert_eq!(view.area_details[0].name, "Prestige Lakeside");
    assert!(view.worker.is_active);
    assert_eq!(view.worker.rating, 0.0);
}

#[tokio::test]
async fn test_worker_with_unknown_references_is_rejected() {
    let ctx = TestContext::new();
    let directory = &ctx.services.directory_service;

    let mut request = worker("Ravi", "9000000002");
    request.services = vec![ObjectId::new().to_hex()];
    let err = directory.create_worker(request).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(msg) if msg.starts_with("Unknown service")));

    let mut request = worker("Ravi", "9000000002");
    request.areas = vec![ObjectId::new().to_hex()];
    let err = directory.create_worker(request).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(msg) if msg.starts_with("Unknown apartment")));

    let mut request = worker("Ravi", "9000000002");
    request.areas = vec!["not-an-id".to_string()];
    let err = directory.create_worker(request).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(msg) if msg.starts_with("Invalid apartment id")));

    assert!(ctx.workers.workers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_worker_update_keeps_ratings() {
    let ctx = TestContext::new();
    let directory = &ctx.services.directory_service;
    let view = directory.create_worker(worker("Meena", "9000000003")).await.unwrap();
    let id = view.worker.id.unwrap();
    {
        let mut workers = ctx.workers.workers.lock().unwrap();
        workers[0].rating = 4.5;
        workers[0].completed_jobs = 12;
    }

    let mut request = worker("Meena K", "9000000003");
    request.is_active = Some(false);
    let view = directory.update_worker(id, request).await.unwrap();
    assert_eq!(view.worker.name, "Meena K");
    assert!(!view.worker.is_active);
    assert_eq!(view.worker.rating, 4.5);
    assert_eq!(view.worker.completed_jobs, 12);

    directory.delete_worker(id).await.unwrap();
    assert!(matches!(directory.get_worker(id).await.unwrap_err(), ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_worker_search_matches_served_apartments() {
    let ctx = TestContext::new();
    let directory = &ctx.services.directory_service;
    let apartments = seed_apartments(&ctx).await;

    let mut request = worker("Suresh", "9000000004");
    request.areas = vec![apartments[3].id.unwrap().to_hex()];
    directory.create_worker(request).await.unwrap();
    directory.create_worker(worker("Kavya", "9000000005")).await.unwrap();

    let page = directory
        .list_workers(PageQuery { search: Some("palm retreat".into()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.workers[0].worker.name, "Suresh");

    let page = directory
        .list_workers(PageQuery { search: Some("kavya".into()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(page.workers.len(), 1);
    assert_eq!(page.workers[0].worker.name, "Kavya");

    let all = directory.list_workers(PageQuery::default()).await.unwrap();
    assert_eq!(all.pagination.total, 2);
    assert_eq!(all.pagination.limit, 20);
}
