use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use engine::boolean::boolean_search;
use engine::lsi::{LsiModel, LsiParams};
use engine::rank::{accumulate_dot_scores, index_search};
use engine::stats::compute_doc_norms;
use engine::{BooleanIndex, DocId, IdfTable, InvertedIndex};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    #[allow(dead_code)]
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    body: String,
}

#[derive(Serialize)]
struct Hit {
    doc_id: DocId,
    score: Option<f32>,
    title: String,
}

#[derive(Parser)]
#[command(name = "lexsem")]
#[command(about = "Query a document collection with boolean, TF-IDF cosine, or latent semantic retrieval", long_about = None)]
struct Cli {
    /// Collection input: a JSON array file, a JSONL file, or a directory of .txt files
    #[arg(long, global = true, default_value = "docs")]
    input: String,
    /// Emit results as JSON instead of a table
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Documents containing every query term (conjunctive AND)
    Boolean {
        query: String,
    },
    /// TF-IDF cosine ranking
    Cosine {
        query: String,
        /// Number of results
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Minimum document frequency for a scored term
        #[arg(long, default_value_t = 0)]
        min_df: u32,
        /// Maximum document-frequency ratio for a scored term
        #[arg(long, default_value_t = 1.0)]
        max_df: f32,
    },
    /// Latent semantic (truncated SVD) ranking
    Lsi {
        query: String,
        /// Number of results
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Latent rank
        #[arg(long, default_value_t = 100)]
        rank: usize,
        /// Minimum document frequency for a vectorized term
        #[arg(long, default_value_t = 75)]
        min_df: u32,
        /// Maximum document-frequency ratio for a vectorized term
        #[arg(long, default_value_t = 0.7)]
        max_df: f32,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let collection = load_collection(Path::new(&cli.input))
        .with_context(|| format!("loading collection from {}", cli.input))?;
    if collection.is_empty() {
        bail!("no documents found under {}", cli.input);
    }
    let bodies: Vec<&str> = collection.iter().map(|(_, body)| body.as_str()).collect();
    tracing::info!(num_docs = bodies.len(), "loaded collection");

    let hits = match cli.command {
        Commands::Boolean { query } => {
            let index = BooleanIndex::from_texts(&bodies);
            boolean_search(&query, &index)
                .into_iter()
                .map(|doc_id| hit(&collection, doc_id, None))
                .collect()
        }
        Commands::Cosine { query, top, min_df, max_df } => {
            let index = InvertedIndex::from_texts(&bodies);
            let idf = IdfTable::compute(&index, min_df, max_df);
            let doc_norms = compute_doc_norms(&index, &idf);
            index_search(&query, &index, &idf, &doc_norms, accumulate_dot_scores)
                .into_iter()
                .take(top)
                .map(|(score, doc_id)| hit(&collection, doc_id, Some(score)))
                .collect()
        }
        Commands::Lsi { query, top, rank, min_df, max_df } => {
            let params = LsiParams {
                min_df,
                max_df_ratio: max_df,
                rank,
                ..Default::default()
            };
            let model = LsiModel::build(&bodies, &params)?;
            let embedded = model.embed_query(&query)?;
            model
                .nearest_documents(&embedded, top)
                .into_iter()
                .map(|(doc, score)| hit(&collection, doc as DocId, Some(score)))
                .collect::<Vec<_>>()
        }
    };

    render(&hits, cli.json)
}

fn hit(collection: &[(String, String)], doc_id: DocId, score: Option<f32>) -> Hit {
    let title = collection
        .get(doc_id as usize)
        .map(|(title, _)| title.clone())
        .unwrap_or_default();
    Hit { doc_id, score, title }
}

fn render(hits: &[Hit], as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(hits)?);
        return Ok(());
    }
    if hits.is_empty() {
        println!("no results");
        return Ok(());
    }
    for hit in hits {
        match hit.score {
            Some(score) => println!("{:>6}  {:<8.4}  {}", hit.doc_id, score, hit.title),
            None => println!("{:>6}  {:<8}  {}", hit.doc_id, "-", hit.title),
        }
    }
    Ok(())
}

/// Load (title, body) pairs from a JSON array file, a JSONL file, or a
/// directory of .txt files (walked in sorted path order so ids are stable).
fn load_collection(input: &Path) -> Result<Vec<(String, String)>> {
    if input.is_dir() {
        return load_text_dir(input);
    }
    match input.extension().and_then(|s| s.to_str()) {
        Some("jsonl") => load_jsonl(input),
        Some("json") => load_json(input),
        _ => bail!("expected a directory, .json, or .jsonl input"),
    }
}

fn load_text_dir(dir: &Path) -> Result<Vec<(String, String)>> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("txt"))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();

    let mut docs = Vec::with_capacity(files.len());
    for file in files {
        let body = fs::read_to_string(&file)?;
        let title = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        docs.push((title, body));
    }
    Ok(docs)
}

fn load_jsonl(file: &Path) -> Result<Vec<(String, String)>> {
    let reader = BufReader::new(File::open(file)?);
    let mut docs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDoc = serde_json::from_str(&line)?;
        docs.push((doc.title.unwrap_or_default(), doc.body));
    }
    Ok(docs)
}

fn load_json(file: &Path) -> Result<Vec<(String, String)>> {
    let reader = BufReader::new(File::open(file)?);
    let parsed: Vec<InputDoc> = serde_json::from_reader(reader)?;
    Ok(parsed
        .into_iter()
        .map(|doc| (doc.title.unwrap_or_default(), doc.body))
        .collect())
}
