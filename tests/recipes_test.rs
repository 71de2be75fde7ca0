// ABOUTME: Integration tests for recipe creation, validation, authorship and listing
// ABOUTME: Exercises the recipe routes end to end against an in-memory database
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{
    create_test_context, create_test_recipe, create_test_user, recipe_draft, seed_catalog,
    TestCatalog, PNG_DATA_URI,
};
use foodgram_server::errors::ErrorCode;
use foodgram_server::services::short_links::RandomShortCodeGenerator;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

fn create_body(catalog: &TestCatalog) -> Value {
    json!({
        "name": "Tomato salad",
        "text": "Slice and season",
        "image": PNG_DATA_URI,
        "cooking_time": 10,
        "tags": [catalog.tag("lunch").id],
        "ingredients": [
            {"id": catalog.ingredient("Помидор").id, "amount": 3},
            {"id": catalog.ingredient("salt").id, "amount": 2}
        ]
    })
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_recipe_returns_full_representation() {
    let ctx = create_test_context().await.unwrap();
    let catalog = seed_catalog(ctx.database()).await.unwrap();
    let (author, token) = create_test_user(&ctx.resources, "chef").await.unwrap();

    let response = AxumTestRequest::post("/api/recipes/")
        .token(&token)
        .json(&create_body(&catalog))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 201);

    let body: Value = response.json();
    assert_eq!(body["name"], "Tomato salad");
    assert_eq!(body["author"]["id"], author.id);
    assert_eq!(body["author"]["is_subscribed"], false);
    assert_eq!(body["is_favorited"], false);
    assert_eq!(body["is_in_shopping_cart"], false);
    assert_eq!(body["tags"][0]["slug"], "lunch");
    assert_eq!(body["ingredients"][0]["name"], "Помидор");
    assert_eq!(body["ingredients"][0]["amount"], 3);
    assert_eq!(body["ingredients"][1]["measurement_unit"], "g");

    let image = body["image"].as_str().unwrap();
    let reference = image
        .strip_prefix("http://testserver/media/")
        .expect("absolute media URL");
    assert!(ctx.media.path().join(reference).exists());
}

#[tokio::test]
async fn test_create_requires_authentication() {
    let ctx = create_test_context().await.unwrap();
    let catalog = seed_catalog(ctx.database()).await.unwrap();

    let response = AxumTestRequest::post("/api/recipes/")
        .json(&create_body(&catalog))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");
}

#[tokio::test]
async fn test_create_rejects_invalid_payloads() {
    let ctx = create_test_context().await.unwrap();
    let catalog = seed_catalog(ctx.database()).await.unwrap();
    let (_, token) = create_test_user(&ctx.resources, "chef").await.unwrap();
    let salt = catalog.ingredient("salt").id;

    let mut duplicate_ingredients = create_body(&catalog);
    duplicate_ingredients["ingredients"] = json!([
        {"id": salt, "amount": 1},
        {"id": salt, "amount": 2}
    ]);

    let mut no_tags = create_body(&catalog);
    no_tags["tags"] = json!([]);

    let mut no_ingredients = create_body(&catalog);
    no_ingredients["ingredients"] = json!([]);

    let mut too_long = create_body(&catalog);
    too_long["cooking_time"] = json!(201);

    let mut zero_amount = create_body(&catalog);
    zero_amount["ingredients"] = json!([{"id": salt, "amount": 0}]);

    let mut unknown_ingredient = create_body(&catalog);
    unknown_ingredient["ingredients"] = json!([{"id": 9999, "amount": 1}]);

    let mut bad_image = create_body(&catalog);
    bad_image["image"] = json!("not an image");

    let mut missing_name = create_body(&catalog);
    missing_name.as_object_mut().unwrap().remove("name");

    for (case, body) in [
        ("duplicate ingredients", duplicate_ingredients),
        ("no tags", no_tags),
        ("no ingredients", no_ingredients),
        ("cooking time", too_long),
        ("zero amount", zero_amount),
        ("unknown ingredient", unknown_ingredient),
        ("bad image", bad_image),
        ("missing name", missing_name),
    ] {
        let response = AxumTestRequest::post("/api/recipes/")
            .token(&token)
            .json(&body)
            .send(ctx.router())
            .await;
        assert_eq!(response.status(), 400, "{case}");
    }

    let (recipes, count) = ctx
        .database()
        .recipes()
        .list(&Default::default(), 10, 0)
        .await
        .unwrap();
    assert!(recipes.is_empty());
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_mistyped_fields_use_structured_errors() {
    let ctx = create_test_context().await.unwrap();
    let catalog = seed_catalog(ctx.database()).await.unwrap();
    let (_, token) = create_test_user(&ctx.resources, "chef").await.unwrap();
    let salt = catalog.ingredient("salt").id;

    let mut text_cooking_time = create_body(&catalog);
    text_cooking_time["cooking_time"] = json!("abc");

    let mut huge_amount = create_body(&catalog);
    huge_amount["ingredients"] = json!([{"id": salt, "amount": u64::MAX}]);

    for (case, body) in [
        ("text cooking time", text_cooking_time),
        ("huge amount", huge_amount),
    ] {
        let response = AxumTestRequest::post("/api/recipes/")
            .token(&token)
            .json(&body)
            .send(ctx.router())
            .await;
        assert_eq!(response.status(), 400, "{case}");
        assert_eq!(
            response.header("content-type").as_deref(),
            Some("application/json"),
            "{case}"
        );
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "INVALID_INPUT", "{case}");
        assert!(body["error"]["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    let response = AxumTestRequest::put("/api/users/me/avatar/")
        .token(&token)
        .json(&json!({"avatar": 42}))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_draft_validation_at_database_layer() {
    let ctx = create_test_context().await.unwrap();
    let catalog = seed_catalog(ctx.database()).await.unwrap();
    let (author, _) = create_test_user(&ctx.resources, "chef").await.unwrap();
    let tag = catalog.tag("lunch").id;
    let salt = catalog.ingredient("salt").id;

    let recipes = ctx.database().recipes();
    let codes = RandomShortCodeGenerator;

    let duplicate = recipe_draft("Dup", &[tag], &[(salt, 1), (salt, 2)]);
    let err = recipes.create(author.id, &duplicate, &codes).await.unwrap_err();
    assert!(err.code.is_client_error());

    let duplicate_tags = recipe_draft("Dup tags", &[tag, tag], &[(salt, 1)]);
    assert!(recipes.create(author.id, &duplicate_tags, &codes).await.is_err());

    let unknown_tag = recipe_draft("Unknown tag", &[4242], &[(salt, 1)]);
    let err = recipes.create(author.id, &unknown_tag, &codes).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

// ============================================================================
// Read
// ============================================================================

#[tokio::test]
async fn test_recipe_detail_reflects_viewer_state() {
    let ctx = create_test_context().await.unwrap();
    let catalog = seed_catalog(ctx.database()).await.unwrap();
    let (author, _) = create_test_user(&ctx.resources, "chef").await.unwrap();
    let (viewer, token) = create_test_user(&ctx.resources, "fan").await.unwrap();
    let recipe = create_test_recipe(
        &ctx.resources,
        author.id,
        "Porridge",
        &[catalog.tag("breakfast").id],
        &[(catalog.ingredient("Молоко").id, 250)],
    )
    .await
    .unwrap();

    ctx.database().favorites().add(viewer.id, recipe.id).await.unwrap();
    ctx.database()
        .subscriptions()
        .subscribe(viewer.id, author.id)
        .await
        .unwrap();

    let path = format!("/api/recipes/{}/", recipe.id);
    let body: Value = AxumTestRequest::get(&path)
        .token(&token)
        .send(ctx.router())
        .await
        .json();
    assert_eq!(body["is_favorited"], true);
    assert_eq!(body["is_in_shopping_cart"], false);
    assert_eq!(body["author"]["is_subscribed"], true);

    let anonymous: Value = AxumTestRequest::get(&path).send(ctx.router()).await.json();
    assert_eq!(anonymous["is_favorited"], false);
    assert_eq!(anonymous["author"]["is_subscribed"], false);

    let response = AxumTestRequest::get("/api/recipes/9999/").send(ctx.router()).await;
    assert_eq!(response.status(), 404);
    let response = AxumTestRequest::get("/api/recipes/abc/").send(ctx.router()).await;
    assert_eq!(response.status(), 404);
}

// ============================================================================
// Update / delete
// ============================================================================

#[tokio::test]
async fn test_only_author_can_modify() {
    let ctx = create_test_context().await.unwrap();
    let catalog = seed_catalog(ctx.database()).await.unwrap();
    let (author, author_token) = create_test_user(&ctx.resources, "chef").await.unwrap();
    let (_, other_token) = create_test_user(&ctx.resources, "intruder").await.unwrap();
    let recipe = create_test_recipe(
        &ctx.resources,
        author.id,
        "Soup",
        &[catalog.tag("lunch").id],
        &[(catalog.ingredient("salt").id, 5)],
    )
    .await
    .unwrap();
    let path = format!("/api/recipes/{}/", recipe.id);

    let update = json!({
        "name": "Better soup",
        "text": "Simmer longer",
        "cooking_time": 45,
        "tags": [catalog.tag("dinner").id],
        "ingredients": [{"id": catalog.ingredient("sugar").id, "amount": 1}]
    });

    let response = AxumTestRequest::patch(&path)
        .token(&other_token)
        .json(&update)
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 403);

    let response = AxumTestRequest::delete(&path)
        .token(&other_token)
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 403);

    let response = AxumTestRequest::patch(&path)
        .token(&author_token)
        .json(&update)
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["name"], "Better soup");
    assert_eq!(body["cooking_time"], 45);
    assert_eq!(body["tags"].as_array().unwrap().len(), 1);
    assert_eq!(body["tags"][0]["slug"], "dinner");
    assert_eq!(body["ingredients"].as_array().unwrap().len(), 1);
    assert_eq!(body["ingredients"][0]["name"], "sugar");
    assert!(body["image"]
        .as_str()
        .unwrap()
        .ends_with("recipes/images/fixture.png"));

    let response = AxumTestRequest::delete(&path)
        .token(&author_token)
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 204);
    assert!(ctx.database().recipes().get(recipe.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_with_new_image_replaces_file() {
    let ctx = create_test_context().await.unwrap();
    let catalog = seed_catalog(ctx.database()).await.unwrap();
    let (_, token) = create_test_user(&ctx.resources, "chef").await.unwrap();

    let created: Value = AxumTestRequest::post("/api/recipes/")
        .token(&token)
        .json(&create_body(&catalog))
        .send(ctx.router())
        .await
        .json();
    let id = created["id"].as_i64().unwrap();
    let old_image = created["image"].as_str().unwrap().to_owned();
    let old_path = ctx
        .media
        .path()
        .join(old_image.strip_prefix("http://testserver/media/").unwrap());
    assert!(old_path.exists());

    let response = AxumTestRequest::patch(&format!("/api/recipes/{id}/"))
        .token(&token)
        .json(&create_body(&catalog))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 200);
    let updated: Value = response.json();
    assert_ne!(updated["image"], created["image"]);
    assert!(!old_path.exists());
}

#[tokio::test]
async fn test_update_requires_tags_and_ingredients() {
    let ctx = create_test_context().await.unwrap();
    let catalog = seed_catalog(ctx.database()).await.unwrap();
    let (author, token) = create_test_user(&ctx.resources, "chef").await.unwrap();
    let recipe = create_test_recipe(
        &ctx.resources,
        author.id,
        "Soup",
        &[catalog.tag("lunch").id],
        &[(catalog.ingredient("salt").id, 5)],
    )
    .await
    .unwrap();

    let response = AxumTestRequest::patch(&format!("/api/recipes/{}/", recipe.id))
        .token(&token)
        .json(&json!({"name": "Soup", "text": "x", "cooking_time": 5}))
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn test_list_filters_and_ordering() {
    let ctx = create_test_context().await.unwrap();
    let catalog = seed_catalog(ctx.database()).await.unwrap();
    let (alice, _) = create_test_user(&ctx.resources, "alice").await.unwrap();
    let (bob, bob_token) = create_test_user(&ctx.resources, "bob").await.unwrap();
    let breakfast = catalog.tag("breakfast").id;
    let lunch = catalog.tag("lunch").id;
    let dinner = catalog.tag("dinner").id;
    let salt = catalog.ingredient("salt").id;

    let waffles = create_test_recipe(&ctx.resources, alice.id, "Waffles", &[breakfast], &[(salt, 1)])
        .await
        .unwrap();
    create_test_recipe(&ctx.resources, alice.id, "Curry", &[dinner], &[(salt, 3)])
        .await
        .unwrap();
    let bagel = create_test_recipe(&ctx.resources, bob.id, "Bagel", &[breakfast, lunch], &[(salt, 1)])
        .await
        .unwrap();

    ctx.database().favorites().add(bob.id, waffles.id).await.unwrap();
    ctx.database().shopping_cart().add(bob.id, bagel.id).await.unwrap();

    let names = |body: &Value| -> Vec<String> {
        body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap().to_owned())
            .collect()
    };

    let all: Value = AxumTestRequest::get("/api/recipes/").send(ctx.router()).await.json();
    assert_eq!(all["count"], 3);
    assert_eq!(names(&all), ["Bagel", "Curry", "Waffles"]);

    let by_author: Value = AxumTestRequest::get(&format!("/api/recipes/?author={}", alice.id))
        .send(ctx.router())
        .await
        .json();
    assert_eq!(names(&by_author), ["Curry", "Waffles"]);

    let by_tags: Value = AxumTestRequest::get("/api/recipes/?tags=lunch&tags=dinner")
        .send(ctx.router())
        .await
        .json();
    assert_eq!(names(&by_tags), ["Bagel", "Curry"]);

    let favorites: Value = AxumTestRequest::get("/api/recipes/?is_favorited=1")
        .token(&bob_token)
        .send(ctx.router())
        .await
        .json();
    assert_eq!(names(&favorites), ["Waffles"]);
    assert_eq!(favorites["results"][0]["is_favorited"], true);

    let not_carted: Value = AxumTestRequest::get("/api/recipes/?is_in_shopping_cart=false")
        .token(&bob_token)
        .send(ctx.router())
        .await
        .json();
    assert_eq!(names(&not_carted), ["Curry", "Waffles"]);

    // Viewer filters are ignored for anonymous callers
    let anonymous: Value = AxumTestRequest::get("/api/recipes/?is_favorited=1")
        .send(ctx.router())
        .await
        .json();
    assert_eq!(anonymous["count"], 3);

    let response = AxumTestRequest::get("/api/recipes/?author=someone")
        .send(ctx.router())
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_list_pagination_links() {
    let ctx = create_test_context().await.unwrap();
    let catalog = seed_catalog(ctx.database()).await.unwrap();
    let (author, _) = create_test_user(&ctx.resources, "chef").await.unwrap();
    let tag = catalog.tag("dinner").id;
    let salt = catalog.ingredient("salt").id;

    for i in 0..5 {
        create_test_recipe(&ctx.resources, author.id, &format!("Dish {i}"), &[tag], &[(salt, 1)])
            .await
            .unwrap();
    }

    let first: Value = AxumTestRequest::get("/api/recipes/?tags=dinner&limit=2")
        .send(ctx.router())
        .await
        .json();
    assert_eq!(first["count"], 5);
    assert_eq!(first["results"].as_array().unwrap().len(), 2);
    assert!(first["previous"].is_null());
    assert_eq!(
        first["next"],
        "http://testserver/api/recipes/?tags=dinner&page=2&limit=2"
    );

    let last: Value = AxumTestRequest::get("/api/recipes/?tags=dinner&limit=2&page=3")
        .send(ctx.router())
        .await
        .json();
    assert_eq!(last["results"].as_array().unwrap().len(), 1);
    assert_eq!(last["results"][0]["name"], "Dish 4");
    assert!(last["next"].is_null());
    assert_eq!(
        last["previous"],
        "http://testserver/api/recipes/?tags=dinner&page=2&limit=2"
    );
}
