//! SQLite persistence for scraped records.
//!
//! Records land in a single `registros` table with a composite UNIQUE
//! constraint over every data column. SQLite treats NULLs as distinct in
//! UNIQUE indexes, so [`RecordStore::save`] also checks for an existing row on
//! the record's populated fields before inserting. The check and the insert
//! are not atomic across connections; a store expects a single writer.

use std::path::Path;

use itertools::Itertools;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params, params_from_iter};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::DatabaseLocation;
use crate::errors::ScrapeError;
use crate::models::{Etapa, Record};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS registros (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    etapa VARCHAR(50) NOT NULL,
    categoria_uva VARCHAR(100),
    tipo_uva VARCHAR(100),
    nome_uva VARCHAR(100),
    categoria_produto VARCHAR(100),
    tipo_produto VARCHAR(100),
    produto VARCHAR(100),
    quantidade_l VARCHAR(50),
    quantidade_kg INTEGER,
    valor_usd INTEGER,
    ano INTEGER NOT NULL,
    pais VARCHAR(100),
    CONSTRAINT uix_registro_unico UNIQUE (
        etapa, ano, categoria_uva, tipo_uva, nome_uva, categoria_produto,
        tipo_produto, produto, quantidade_l, quantidade_kg, valor_usd, pais
    )
);
CREATE INDEX IF NOT EXISTS idx_registros_etapa ON registros (etapa);
CREATE INDEX IF NOT EXISTS idx_registros_ano ON registros (ano);
CREATE INDEX IF NOT EXISTS idx_registros_pais ON registros (pais);
";

const COLUMNS: &str = "etapa, categoria_uva, tipo_uva, nome_uva, categoria_produto, tipo_produto, \
                       produto, quantidade_l, quantidade_kg, valor_usd, ano, pais";

/// How many records a [`RecordStore::save`] call inserted vs. found already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    pub inserted: usize,
    pub ignored: usize,
}

/// Overview of what the store holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub total: usize,
    pub por_etapa: Vec<(String, usize)>,
    pub anos: Vec<i32>,
    pub categorias_produto: Vec<String>,
    pub categorias_uva: Vec<String>,
}

pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open the store named by a `--database` value (path or `sqlite://` URL).
    pub fn connect(database: &str) -> Result<Self, ScrapeError> {
        match DatabaseLocation::parse(database)? {
            DatabaseLocation::File(path) => Self::open(path),
            DatabaseLocation::Memory => Self::open_in_memory(),
        }
    }

    /// Open (or create) the database file and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, ScrapeError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, ScrapeError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn is_empty(&self) -> Result<bool, ScrapeError> {
        let any: bool = self
            .conn
            .query_row("SELECT EXISTS(SELECT 1 FROM registros)", [], |row| row.get(0))?;
        Ok(!any)
    }

    /// Insert every record that is not already stored, in one transaction.
    #[instrument(level = "info", skip_all, fields(candidates = records.len()))]
    pub fn save(&mut self, records: &[Record]) -> Result<SaveSummary, ScrapeError> {
        let tx = self.conn.transaction()?;
        let mut summary = SaveSummary::default();

        for record in records {
            let (clause, values) = match_clause(record);
            let exists: bool = tx.query_row(
                &format!("SELECT EXISTS(SELECT 1 FROM registros WHERE {clause})"),
                params_from_iter(values),
                |row| row.get(0),
            )?;
            if exists {
                summary.ignored += 1;
                continue;
            }
            let changed = tx.execute(
                &format!("INSERT OR IGNORE INTO registros ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"),
                params![
                    record.etapa.label(),
                    record.categoria_uva,
                    record.tipo_uva,
                    record.nome_uva,
                    record.categoria_produto,
                    record.tipo_produto,
                    record.produto,
                    record.quantidade_l,
                    record.quantidade_kg,
                    record.valor_usd,
                    record.ano,
                    record.pais,
                ],
            )?;
            if changed == 0 {
                summary.ignored += 1;
            } else {
                debug!(etapa = %record.etapa, ano = record.ano, "Inserted record");
                summary.inserted += 1;
            }
        }

        tx.commit()?;
        info!(inserted = summary.inserted, ignored = summary.ignored, "Saved records");
        Ok(summary)
    }

    /// All stored records of one stage, in insertion order.
    pub fn list(&self, etapa: Etapa) -> Result<Vec<Record>, ScrapeError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM registros WHERE etapa = ?1 ORDER BY id"))?;
        let rows = stmt
            .query_map([etapa.label()], stored_record)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(label, record)| -> Result<Record, ScrapeError> {
                Ok(Record {
                    etapa: Etapa::from_label(&label)?,
                    ..record
                })
            })
            .collect()
    }

    pub fn summary(&self) -> Result<StoreSummary, ScrapeError> {
        let total: i64 = self.conn.query_row("SELECT COUNT(*) FROM registros", [], |row| row.get(0))?;

        let por_etapa = self
            .conn
            .prepare("SELECT etapa, COUNT(*) FROM registros GROUP BY etapa ORDER BY etapa")?
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize)))?
            .collect::<Result<Vec<_>, _>>()?;

        let anos = self
            .conn
            .prepare("SELECT DISTINCT ano FROM registros ORDER BY ano")?
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i32>, _>>()?;

        Ok(StoreSummary {
            total: total as usize,
            por_etapa,
            anos,
            categorias_produto: self.distinct_text("categoria_produto")?,
            categorias_uva: self.distinct_text("categoria_uva")?,
        })
    }

    fn distinct_text(&self, column: &str) -> Result<Vec<String>, ScrapeError> {
        let values = self
            .conn
            .prepare(&format!(
                "SELECT DISTINCT {column} FROM registros WHERE {column} IS NOT NULL ORDER BY {column}"
            ))?
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }
}

/// WHERE clause matching a record on its populated fields.
///
/// Empty `quantidade_l` and `pais` count as unpopulated, so the total rows of
/// production and commercialization are matched without a quantity.
fn match_clause(record: &Record) -> (String, Vec<Value>) {
    let text = |column: &'static str, value: &Option<String>, skip_empty: bool| {
        value
            .as_ref()
            .filter(|v| !(skip_empty && v.is_empty()))
            .map(|v| (column, Value::Text(v.clone())))
    };
    let int = |column: &'static str, value: Option<i64>| value.map(|v| (column, Value::Integer(v)));

    let conditions: Vec<(&str, Value)> = [
        Some(("etapa", Value::Text(record.etapa.label().to_string()))),
        text("categoria_uva", &record.categoria_uva, false),
        text("tipo_uva", &record.tipo_uva, false),
        text("nome_uva", &record.nome_uva, false),
        text("categoria_produto", &record.categoria_produto, false),
        text("tipo_produto", &record.tipo_produto, false),
        text("produto", &record.produto, false),
        text("quantidade_l", &record.quantidade_l, true),
        int("quantidade_kg", record.quantidade_kg),
        int("valor_usd", record.valor_usd),
        Some(("ano", Value::Integer(i64::from(record.ano)))),
        text("pais", &record.pais, true),
    ]
    .into_iter()
    .flatten()
    .collect();

    let clause = conditions
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
        .join(" AND ");
    let values = conditions.into_iter().map(|(_, v)| v).collect();
    (clause, values)
}

/// A stored row as (etapa label, record). The label is validated by the caller.
fn stored_record(row: &Row<'_>) -> rusqlite::Result<(String, Record)> {
    let ano: i32 = row.get(10)?;
    let record = Record {
        categoria_uva: row.get(1)?,
        tipo_uva: row.get(2)?,
        nome_uva: row.get(3)?,
        categoria_produto: row.get(4)?,
        tipo_produto: row.get(5)?,
        produto: row.get(6)?,
        quantidade_l: row.get(7)?,
        quantidade_kg: row.get(8)?,
        valor_usd: row.get(9)?,
        pais: row.get(11)?,
        ..Record::new(Etapa::Producao, ano)
    };
    Ok((row.get(0)?, record))
}
