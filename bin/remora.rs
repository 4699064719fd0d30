use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use remora::config::{Bm25Params, RetrievalSettings};
use remora::corpus;
use remora::engine::RetrievalEngine;
use remora::index::{self, IndexBuilder, VsmIndex};
use remora::models::SearchMode;
use remora::tokenizer::Tokenizer;

#[derive(Parser)]
#[command(name = "remora", version, about = "Positional-index document retrieval")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an index from a JSONL corpus and a vocabulary file
    Build {
        /// Corpus file or directory of JSONL files
        #[arg(long)]
        corpus: PathBuf,
        /// Vocabulary file, one token per line
        #[arg(long)]
        vocab: PathBuf,
        /// Output index directory
        #[arg(long)]
        index: PathBuf,
        /// Also write the legacy binary postings files
        #[arg(long)]
        legacy: bool,
        /// Stop after this many documents
        #[arg(long)]
        doc_limit: Option<usize>,
    },
    /// Run a query batch against a built index
    Search {
        /// Index directory produced by `build`
        #[arg(long)]
        index: PathBuf,
        /// Query file (JSONL or a JSON array)
        #[arg(long)]
        queries: PathBuf,
        /// Retrieval model: boolean, bm25, vsm, or feedback
        #[arg(long, default_value = "bm25")]
        mode: SearchMode,
        /// Results per query
        #[arg(long, default_value_t = 100)]
        top_k: usize,
        /// BM25 k1 override (otherwise chosen by top-k)
        #[arg(long)]
        k1: Option<f64>,
        /// BM25 b override (otherwise chosen by top-k)
        #[arg(long)]
        b: Option<f64>,
        /// Output run file; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn build(
    corpus_path: PathBuf,
    vocab_path: PathBuf,
    index_dir: PathBuf,
    legacy: bool,
    doc_limit: Option<usize>,
) -> anyhow::Result<()> {
    let vocabulary = corpus::read_vocabulary(&vocab_path)
        .with_context(|| format!("reading vocabulary {}", vocab_path.display()))?;
    let docs = corpus::read_corpus(&corpus_path)
        .with_context(|| format!("reading corpus {}", corpus_path.display()))?;
    info!(docs = docs.len(), vocab = vocabulary.len(), "corpus read");

    let tokenizer = Tokenizer::default();
    let mut builder = IndexBuilder::new(vocabulary);
    let limit = doc_limit.unwrap_or(usize::MAX);
    for doc in docs.iter().take(limit) {
        builder.add_document(&doc.doc_id, &tokenizer.tokenize(&doc.text));
    }
    let built = builder.build();

    let vsm = VsmIndex::from_store(&built.store, built.stats.doc_count);
    index::json::save_to_dir(&index_dir, &built, &vsm)
        .with_context(|| format!("writing index to {}", index_dir.display()))?;
    if legacy {
        index::binary::write_legacy(&built.store, &index_dir)
            .context("writing legacy binary index")?;
    }
    Ok(())
}

fn search(
    index_dir: PathBuf,
    query_path: PathBuf,
    mode: SearchMode,
    top_k: usize,
    k1: Option<f64>,
    b: Option<f64>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut settings = RetrievalSettings::default();
    if let (Some(k1), Some(b)) = (k1, b) {
        settings.bm25 = Some(Bm25Params::new(k1, b));
    }

    let engine = RetrievalEngine::open(&index_dir, settings)
        .with_context(|| format!("opening index {}", index_dir.display()))?;
    let queries = corpus::read_queries(&query_path)
        .with_context(|| format!("reading queries {}", query_path.display()))?;
    info!(queries = queries.len(), %mode, top_k, "running batch");

    let hits = engine.run_batch(mode, &queries, top_k)?;

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(&path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    for hit in &hits {
        writeln!(writer, "{}", hit.run_line())?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("remora=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build {
            corpus,
            vocab,
            index,
            legacy,
            doc_limit,
        } => build(corpus, vocab, index, legacy, doc_limit),
        Command::Search {
            index,
            queries,
            mode,
            top_k,
            k1,
            b,
            output,
        } => search(index, queries, mode, top_k, k1, b, output),
    }
}
