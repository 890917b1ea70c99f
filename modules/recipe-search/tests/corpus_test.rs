//! Corpus job: category paging, per-recipe embedding failures, persistence
//! and semantic search over the written file.

use std::sync::Arc;
use std::time::Duration;

use recipe_search::corpus::{read_corpus, write_corpus};
use recipe_search::testing::{full_meal, summary_meal, FixedEmbedder, MockRecipeSource, SourceCall};
use recipe_search::{CorpusBuilder, CorpusOptions, SearchFilters, SemanticIndex};

fn no_delay() -> CorpusOptions {
    CorpusOptions {
        page_delay: Duration::ZERO,
        embed_concurrency: 4,
    }
}

fn two_category_source() -> MockRecipeSource {
    MockRecipeSource::new()
        .with_categories(&["Beef", "Dessert"])
        .on_category("Beef", vec![summary_meal("1", "Stew"), summary_meal("2", "Bad Pie")])
        .on_category("Dessert", vec![summary_meal("3", "Trifle")])
        .on_lookup(full_meal("1", "Stew", "Beef", "British"))
        .on_lookup(full_meal("2", "Bad Pie", "Beef", "British"))
        .on_lookup(full_meal("3", "Trifle", "Dessert", "British"))
}

#[tokio::test]
async fn walks_every_category_page_in_order() {
    let source = Arc::new(two_category_source());
    let builder = CorpusBuilder::new(source.clone(), Arc::new(FixedEmbedder::new()), no_delay());

    let recipes = builder.fetch_all().await;

    let names: Vec<_> = recipes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Stew", "Bad Pie", "Trifle"]);
    assert_eq!(source.calls()[0], SourceCall::Categories);
    assert_eq!(source.lookup_count(), 3);
    assert!(recipes.iter().all(|r| r.ingredients.len() == 2));
}

#[tokio::test]
async fn empty_page_ends_the_walk() {
    let source = Arc::new(
        MockRecipeSource::new()
            .with_categories(&["Beef", "Goat", "Dessert"])
            .on_category("Beef", vec![summary_meal("1", "Stew")])
            .on_category("Dessert", vec![summary_meal("3", "Trifle")])
            .on_lookup(full_meal("1", "Stew", "Beef", "British"))
            .on_lookup(full_meal("3", "Trifle", "Dessert", "British")),
    );
    let builder = CorpusBuilder::new(source.clone(), Arc::new(FixedEmbedder::new()), no_delay());

    let recipes = builder.fetch_all().await;

    assert_eq!(recipes.len(), 1);
    assert!(!source.calls().contains(&SourceCall::Category("Dessert".into())));
}

#[tokio::test]
async fn failed_page_keeps_earlier_pages() {
    let source = Arc::new(two_category_source().failing_on(SourceCall::Category("Dessert".into())));
    let builder = CorpusBuilder::new(source, Arc::new(FixedEmbedder::new()), no_delay());

    let recipes = builder.fetch_all().await;

    assert_eq!(recipes.len(), 2);
}

#[tokio::test]
async fn embedding_failure_keeps_recipe_without_vector() {
    let embedder = Arc::new(FixedEmbedder::new().failing_on("Bad Pie"));
    let builder = CorpusBuilder::new(Arc::new(two_category_source()), embedder.clone(), no_delay());

    let corpus = builder.build().await;

    assert_eq!(corpus.len(), 3);
    assert_eq!(embedder.call_count(), 3);
    let missing: Vec<_> = corpus
        .iter()
        .filter(|r| r.embedding.is_none())
        .map(|r| r.recipe.name.as_str())
        .collect();
    assert_eq!(missing, vec!["Bad Pie"]);
    assert_eq!(corpus[0].recipe.name, "Stew");
    assert_eq!(corpus[2].recipe.name, "Trifle");
}

#[tokio::test]
async fn written_corpus_reads_back_and_answers_queries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("recipes.json");

    let stew_text = "Stew - Beef - British - 1 tsp Salt, 200ml Water - Cook the Stew.";
    let trifle_text = "Trifle - Dessert - British - 1 tsp Salt, 200ml Water - Cook the Trifle.";
    let embedder = Arc::new(
        FixedEmbedder::new()
            .failing_on("Bad Pie")
            .on_text(stew_text, vec![1.0, 0.0, 0.0])
            .on_text(trifle_text, vec![0.0, 1.0, 0.0])
            .on_text("hearty beef", vec![0.9, 0.1, 0.0]),
    );
    let builder = CorpusBuilder::new(Arc::new(two_category_source()), embedder.clone(), no_delay());

    let corpus = builder.build().await;
    write_corpus(&path, &corpus).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"thumbnailUrl\""));
    assert_eq!(read_corpus(&path).unwrap().len(), 3);

    let index = SemanticIndex::load(&path).unwrap();
    assert_eq!(index.len(), 3);

    let hits = index
        .search(embedder.as_ref(), "hearty beef", &SearchFilters::default(), 10)
        .await
        .unwrap();
    let names: Vec<_> = hits.iter().map(|h| h.recipe.name.as_str()).collect();
    assert_eq!(names, vec!["Stew", "Trifle"]);
    assert!(hits[0].similarity > hits[1].similarity);

    let desserts = SearchFilters {
        category: Some("Dessert".into()),
        ..Default::default()
    };
    let hits = index.search(embedder.as_ref(), "hearty beef", &desserts, 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].recipe.name, "Trifle");
}

#[test]
fn unwritable_output_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let result = write_corpus(&blocker.join("recipes.json"), &[]);
    assert!(result.is_err());
}
