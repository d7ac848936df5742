//! Interactive console for ThalamusDB, ported from `tdb/console.py`'s
//! `Console.run`: a line-oriented REPL that accumulates input until a
//! `;`-terminated statement, dispatches DDL straight to the engine, and
//! runs `SELECT` through the bounded execution loop.

mod ingestion;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use thalamusdb::{
    Catalog, Constraints, EngineConfig, ExecutionEngine, LlmClient, LlmConfig, RelationalEngine,
    SqliteEngine,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the backing SQLite database file, or `:memory:`.
    #[arg(short, long, default_value = "thalamusdb.sqlite")]
    database: String,

    #[arg(long, default_value_t = 0.1)]
    error_threshold: f64,

    /// Stop after this many LLM calls, regardless of error.
    #[arg(long)]
    llm_call_budget: Option<u64>,

    #[arg(long, default_value_t = 10)]
    batch_size: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let engine = SqliteEngine::open(&args.database).await?;
    let llm: Box<dyn LlmClient> = match LlmConfig::from_env() {
        Some(config) => config.build_client(),
        None => {
            eprintln!(
                "No LLM API key found (set ANTHROPIC_API_KEY or OPENAI_API_KEY). \
                 Semantic predicates will fail at query time."
            );
            return Err(anyhow::anyhow!("missing LLM credentials"));
        }
    };

    let config = EngineConfig {
        batch_size: args.batch_size,
        ..EngineConfig::default()
    };
    let constraints = match args.llm_call_budget {
        Some(budget) => Constraints {
            error_threshold: args.error_threshold,
            llm_call_budget: Some(budget),
            wall_clock_budget_secs: None,
        },
        None => Constraints::error_only(args.error_threshold),
    };

    println!("Connected to {}.", args.database);
    println!("Enter SQL, end each statement with ';'. Type \\q to quit.\n");

    let mut rl = DefaultEditor::new()?;
    let mut pending = String::new();

    loop {
        let prompt = if pending.is_empty() { "sql> " } else { "...> " };
        match rl.readline(prompt) {
            Ok(line) => {
                if line.trim() == "\\q" {
                    break;
                }
                rl.add_history_entry(line.as_str()).ok();
                pending.push_str(&line);
                pending.push(' ');

                if !pending.trim_end().ends_with(';') {
                    continue;
                }

                let statement = pending.split_whitespace().collect::<Vec<_>>().join(" ");
                pending.clear();

                if let Err(e) = dispatch(
                    &engine,
                    llm.as_ref(),
                    &config,
                    &constraints,
                    &statement,
                )
                .await
                {
                    eprintln!("Error: {e:#}");
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err:?}");
                break;
            }
        }
    }

    Ok(())
}

async fn dispatch(
    engine: &SqliteEngine,
    llm: &dyn LlmClient,
    config: &EngineConfig,
    constraints: &Constraints,
    statement: &str,
) -> anyhow::Result<()> {
    let upper = statement.trim().to_ascii_uppercase();

    if upper.starts_with("CREATE TABLE") || upper.starts_with("ALTER TABLE") {
        engine.execute_ddl(statement.trim_end_matches(';')).await?;
        println!("OK.");
    } else if upper.starts_with("COPY ") {
        let stmt = ingestion::parse_copy(statement)?;
        let inserted = ingestion::copy_csv(engine, &stmt).await?;
        println!("Loaded {inserted} rows into {}.", stmt.table);
    } else if upper.starts_with("SELECT") {
        run_select(engine, llm, config, constraints, statement).await?;
    } else {
        println!("Invalid statement: {statement}");
    }

    Ok(())
}

async fn run_select(
    engine: &SqliteEngine,
    llm: &dyn LlmClient,
    config: &EngineConfig,
    constraints: &Constraints,
    statement: &str,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    let catalog = Catalog::load(engine).await?;
    let query = thalamusdb::parse_and_qualify(statement, &catalog)?;

    let exec = ExecutionEngine::new(engine, llm, config.clone(), constraints.clone());
    let result = exec.run(&query).await?;

    print_result(&result);
    println!("Query executed in {:.2} seconds.", start.elapsed().as_secs_f64());
    println!("#LLM Calls: {}", result.counters.llm_calls);
    println!("#Input Tokens: {}", result.counters.input_tokens);
    println!("#Output Tokens: {}", result.counters.output_tokens);
    println!("Error bound: {:.4}", result.error);

    Ok(())
}

fn print_result(result: &thalamusdb::TdbResult) {
    let columns = result.columns();
    if !columns.is_empty() {
        println!("{}", columns.join(" | "));
    }
    for row in result.best_guess_rows() {
        let rendered: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("{}", rendered.join(" | "));
    }
}
