use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use pokedex::list_state::ListQuery;
use pokedex::pokemon::{BaseStat, CardData, Entry, StatName, TypeName, Typing};
use pokedex::query::{EntryDetail, ListPage, QueryError};
use pokedex::{AppState, Config, PokedexSource, router};
use std::sync::Arc;
use tower::ServiceExt;

struct FakeSource {
    entries: Vec<Entry>,
}

fn entry(id: u32, name: &str, type_name: TypeName) -> Entry {
    Entry {
        id,
        name: name.to_string(),
        height_deci: 7,
        weight_deci: 69,
        typing: Typing::Single(type_name),
        image: format!("https://img.example/{id}.png"),
        stats: vec![BaseStat {
            stat: StatName::Hp,
            value: 45 + id,
        }],
        abilities: Vec::new(),
        species: None,
    }
}

#[async_trait]
impl PokedexSource for FakeSource {
    async fn list_entries(&self, query: &ListQuery) -> Result<ListPage, QueryError> {
        let needle = query.name_pattern.trim_matches('%').to_lowercase();
        let matching: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| e.name.contains(&needle))
            .collect();
        let entries = matching
            .iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|e| CardData {
                id: e.id,
                name: e.name.clone(),
                image: e.image.clone(),
                types: e.typing.to_vec(),
            })
            .collect();
        Ok(ListPage {
            entries,
            total_count: matching.len() as u64,
        })
    }

    async fn entry_detail(&self, id: u32) -> Result<Option<EntryDetail>, QueryError> {
        Ok(self
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .map(|entry| EntryDetail {
                entry,
                efficacy: Vec::new(),
            }))
    }
}

struct DownSource;

#[async_trait]
impl PokedexSource for DownSource {
    async fn list_entries(&self, _query: &ListQuery) -> Result<ListPage, QueryError> {
        Err(QueryError::Status(503))
    }

    async fn entry_detail(&self, _id: u32) -> Result<Option<EntryDetail>, QueryError> {
        Err(QueryError::Status(503))
    }
}

fn app_with(source: Arc<dyn PokedexSource>) -> axum::Router {
    router(Arc::new(AppState {
        source,
        config: Config::default(),
    }))
}

fn app() -> axum::Router {
    let entries = (1..=25)
        .map(|id| entry(id, &format!("mon{id}"), TypeName::Normal))
        .chain([entry(143, "snorlax", TypeName::Normal)])
        .collect();
    app_with(Arc::new(FakeSource { entries }))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get("location")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, location, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_list_renders_first_page() {
    let (status, _, body) = get(app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("26 results"));
    assert!(body.contains(r#"href="/pokemon/1""#));
    assert!(!body.contains(r#"href="/pokemon/11""#));
    assert!(body.contains(r#"href="/?page=2">Next"#));
}

#[tokio::test]
async fn test_search_without_matches_shows_no_results() {
    let (status, _, body) = get(app(), "/?q=zzz").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No results"));
    assert!(body.contains("0 results"));
}

#[tokio::test]
async fn test_search_in_compare_mode_keeps_selection() {
    let (status, _, body) = get(app(), "/?q=mon&compare=1&selected=5%2C9").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<input type="hidden" name="selected" value="5,9">"#));
    assert!(body.contains(r#"href="/compare?p1=5&amp;p2=9""#));
}

#[tokio::test]
async fn test_non_numeric_page_redirects_home() {
    let (status, location, _) = get(app(), "/?page=abc").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_page_past_the_end_redirects_to_last_page() {
    let (status, location, _) = get(app(), "/?page=9").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/?page=3"));
}

#[tokio::test]
async fn test_detail_page() {
    let (status, _, body) = get(app(), "/pokemon/143").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("snorlax #143 | Pokédex"));
    assert!(body.contains("Base Stats"));
}

#[tokio::test]
async fn test_detail_rejects_bad_ids() {
    for uri in ["/pokemon/0", "/pokemon/abc", "/pokemon/999"] {
        let (status, _, body) = get(app(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body.contains("could not be found"));
    }
}

#[tokio::test]
async fn test_compare_page() {
    let (status, _, body) = get(app(), "/compare?p1=1&p2=143").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Head-to-Head Comparison"));
    assert!(body.contains("mon1"));
    assert!(body.contains("snorlax"));
}

#[tokio::test]
async fn test_compare_with_invalid_ids_redirects_home() {
    for uri in ["/compare?p1=abc", "/compare?p1=1", "/compare?p1=0&p2=4"] {
        let (status, location, _) = get(app(), uri).await;
        assert_eq!(status, StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location.as_deref(), Some("/"));
    }
}

#[tokio::test]
async fn test_compare_with_unknown_id_is_not_found() {
    let (status, _, _) = get(app(), "/compare?p1=1&p2=999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upstream_failure() {
    let (status, _, body) = get(app_with(Arc::new(DownSource)), "/pokemon/1").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("Upstream unavailable"));

    let (status, _, body) = get(app_with(Arc::new(DownSource)), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("could not be reached"));
}

#[tokio::test]
async fn test_random_and_health() {
    let (status, location, _) = get(app(), "/random").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let location = location.unwrap();
    let id: u32 = location.trim_start_matches("/pokemon/").parse().unwrap();
    assert!((1..=1025).contains(&id));

    let (status, _, body) = get(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
