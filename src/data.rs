use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Number of fraction digits shown for money.
pub const DISPLAY_DIGITS: u32 = 2;

/// One sale, as stored in a month's ledger. The field order matters for the
/// persisted document (`valor` first, then `cliente`), and the amount is kept as
/// a JSON number so older ledgers keep loading.
///
/// Amounts are never negative: `SaleRecord::new` is the only place the shell
/// builds records, and it refuses negative values before they reach a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SaleRecord {
    #[serde(rename = "valor", with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "cliente")]
    pub client: String,
}

impl SaleRecord {
    pub fn new(client: &str, amount: Decimal) -> Result<Self, Error> {
        let client = client.trim();
        if client.is_empty() {
            return Err(Error::EmptyClient);
        }
        if amount < Decimal::ZERO {
            return Err(Error::NegativeAmount);
        }
        Ok(Self {
            amount,
            client: client.to_owned(),
        })
    }
}

/// A `YYYY-MM` month identifier. Only valid months get through `FromStr`, which
/// also keeps arbitrary user text out of file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl FromStr for PeriodKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // `YYYY-MM` only; chrono alone would also take `2024-1`
        if s.len() != 7 || s.as_bytes()[4] != b'-' {
            return Err(Error::InvalidPeriod(s.to_owned()));
        }
        NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map(Self::from_date)
            .map_err(|_| Error::InvalidPeriod(s.to_owned()))
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Everything that can go wrong while handling a sale. None of these stop the
/// program; the shell turns each one into a notice and carries on.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("O valor deve ser positivo.")]
    NegativeAmount,
    #[error("Entrada inválida. Digite um número válido.")]
    InvalidAmount,
    #[error("O nome do cliente não pode ficar vazio.")]
    EmptyClient,
    #[error("Período inválido: '{0}'. Use o formato YYYY-MM.")]
    InvalidPeriod(String),
    #[error("Entrada inválida. Digite um número válido.")]
    InvalidIndex,
    #[error("Número inválido.")]
    IndexOutOfRange,
    #[error("O total das vendas excede o maior valor suportado.")]
    TotalOverflow,
    #[error("Não foi possível salvar as vendas: {0}")]
    Storage(String),
}
