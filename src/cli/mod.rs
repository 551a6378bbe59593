//! Command-line front end: infer schemas from JSON documents, print DDL,
//! generate model source files.

use std::fs;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use rowbridge::json::records_from_json;
use rowbridge::{
    Dialect, InferenceOptions, PostgresDialect, Schema, SchemaInferer, SqlServerDialect, codegen,
};

#[derive(Parser)]
#[command(
    name = "rowbridge",
    about = "Infer table schemas from JSON data and generate models",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Infer a schema from JSON records and print it as JSON
    Schema {
        /// JSON file holding an object or an array of objects, '-' for stdin
        #[arg(short, long)]
        input: PathBuf,
        /// Table name for the inferred schema
        #[arg(short, long)]
        name: String,
        /// Keep keys that are null in every record as nullable text columns
        #[arg(long)]
        keep_null_keys: bool,
    },
    /// Print CREATE TABLE DDL for the inferred schema
    Ddl {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        name: String,
        /// Target store dialect
        #[arg(long, value_enum, default_value_t = DialectChoice::SqlServer)]
        dialect: DialectChoice,
        #[arg(long)]
        keep_null_keys: bool,
    },
    /// Generate a Rust model source file for the inferred schema
    Generate {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        name: String,
        /// Directory the generated file is written into
        #[arg(short, long)]
        out_dir: PathBuf,
        #[arg(long)]
        keep_null_keys: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectChoice {
    SqlServer,
    Postgres,
}

impl DialectChoice {
    fn dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::SqlServer => Box::new(SqlServerDialect),
            Self::Postgres => Box::new(PostgresDialect),
        }
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Schema {
                input,
                name,
                keep_null_keys,
            } => {
                let schema = infer_from_file(&input, &name, keep_null_keys)?;
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            Command::Ddl {
                input,
                name,
                dialect,
                keep_null_keys,
            } => {
                let schema = infer_from_file(&input, &name, keep_null_keys)?;
                let dialect = dialect.dialect();
                println!("{}", codegen::create_table_sql(&schema, dialect.as_ref()));
            }
            Command::Generate {
                input,
                name,
                out_dir,
                keep_null_keys,
            } => {
                let schema = infer_from_file(&input, &name, keep_null_keys)?;
                fs::create_dir_all(&out_dir)
                    .with_context(|| format!("Cannot create {}", out_dir.display()))?;
                let path = codegen::write_source(&schema, &out_dir)?;
                println!("{}", path.display());
            }
        }
        Ok(())
    }
}

fn infer_from_file(input: &Path, name: &str, keep_null_keys: bool) -> anyhow::Result<Schema> {
    let raw = read_input(input)?;
    let json: serde_json::Value =
        serde_json::from_str(&raw).context("Input is not valid JSON")?;
    let records = records_from_json(&json)?;

    let options = InferenceOptions {
        keep_null_only_keys: keep_null_keys,
        ..InferenceOptions::default()
    };
    Ok(SchemaInferer::from_records(name, &records, &options)?)
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Cannot read stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).with_context(|| format!("Cannot read {}", input.display()))
    }
}
