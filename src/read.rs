use crate::data::{Error, PeriodKey, SaleRecord};
use chrono::NaiveDate;
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

/// Key of the month containing `today`.
pub(crate) fn current_period_key(today: NaiveDate) -> PeriodKey {
    PeriodKey::from_date(today)
}

/// What a load actually found. Only `Found` carries records; every other case
/// presents as an empty ledger, but the shell still gets to tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoadOutcome {
    Found(Vec<SaleRecord>),
    Missing,
    Empty,
    Corrupt(String),
    Unreadable(String),
}

impl LoadOutcome {
    pub fn exists(&self) -> bool {
        !matches!(self, LoadOutcome::Missing)
    }

    pub fn records(self) -> Vec<SaleRecord> {
        match self {
            LoadOutcome::Found(records) => records,
            _ => Vec::new(),
        }
    }

    /// Diagnostic for the operator, if this load degraded to an empty ledger
    /// for a reason worth mentioning.
    pub fn notice(&self) -> Option<String> {
        match self {
            LoadOutcome::Found(_) | LoadOutcome::Missing => None,
            LoadOutcome::Empty => Some("O arquivo foi encontrado, mas está vazio.".to_owned()),
            LoadOutcome::Corrupt(reason) => Some(format!(
                "O arquivo foi encontrado, mas o conteúdo JSON é inválido ({reason})."
            )),
            LoadOutcome::Unreadable(reason) => {
                Some(format!("Não foi possível ler o arquivo ({reason})."))
            }
        }
    }
}

/// Storage of month ledgers, one document per period. The shell only talks to
/// this trait, which lets the tests swap the files for a map in memory.
pub(crate) trait LedgerStore {
    fn load(&self, period: PeriodKey) -> LoadOutcome;
    fn save(&self, period: PeriodKey, records: &[SaleRecord]) -> Result<(), Error>;

    fn exists(&self, period: PeriodKey) -> bool {
        self.load(period).exists()
    }
}

impl<T: LedgerStore + ?Sized> LedgerStore for &T {
    fn load(&self, period: PeriodKey) -> LoadOutcome {
        (**self).load(period)
    }

    fn save(&self, period: PeriodKey, records: &[SaleRecord]) -> Result<(), Error> {
        (**self).save(period, records)
    }

    fn exists(&self, period: PeriodKey) -> bool {
        (**self).exists(period)
    }
}

/// Ledgers kept as `vendas_<YYYY-MM>.json` files inside one directory.
#[derive(Debug, Clone)]
pub(crate) struct JsonLedgers {
    dir: PathBuf,
}

impl JsonLedgers {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, period: PeriodKey) -> PathBuf {
        self.dir.join(file_name(period))
    }
}

pub(crate) fn file_name(period: PeriodKey) -> String {
    format!("vendas_{period}.json")
}

impl LedgerStore for JsonLedgers {
    fn load(&self, period: PeriodKey) -> LoadOutcome {
        let path = self.path_for(period);
        tracing::debug!("loading ledger {}", path.display());
        match fs::File::open(&path) {
            Ok(file) => read_records(file, &path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("no ledger at {}", path.display());
                LoadOutcome::Missing
            }
            Err(e) => {
                tracing::warn!("cannot open {}: {e}", path.display());
                LoadOutcome::Unreadable(e.to_string())
            }
        }
    }

    fn save(&self, period: PeriodKey, records: &[SaleRecord]) -> Result<(), Error> {
        let path = self.path_for(period);
        crate::write::write_ledger(&path, records).map_err(|e| {
            tracing::warn!("cannot save {}: {e:#}", path.display());
            Error::Storage(e.to_string())
        })
    }

    fn exists(&self, period: PeriodKey) -> bool {
        self.path_for(period).exists()
    }
}

/// Parses a whole ledger document. Blank content counts as empty storage, and
/// anything that is not a list of sales counts as corrupt.
pub(crate) fn read_records<R: Read>(mut reader: R, origin: impl AsRef<Path>) -> LoadOutcome {
    let origin = origin.as_ref();
    let mut content = String::new();
    if let Err(e) = reader.read_to_string(&mut content) {
        tracing::warn!("cannot read {}: {e}", origin.display());
        return LoadOutcome::Unreadable(e.to_string());
    }
    if content.trim().is_empty() {
        tracing::warn!("{} is empty", origin.display());
        return LoadOutcome::Empty;
    }
    match serde_json::from_str::<Vec<SaleRecord>>(&content) {
        Ok(records) => {
            tracing::debug!("loaded {} sales from {}", records.len(), origin.display());
            LoadOutcome::Found(records)
        }
        Err(e) => {
            tracing::warn!("{} is not a valid ledger: {e}", origin.display());
            LoadOutcome::Corrupt(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{current_period_key, read_records, JsonLedgers, LedgerStore, LoadOutcome};
    use crate::data::{PeriodKey, SaleRecord};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn period() -> PeriodKey {
        "2024-01".parse().unwrap()
    }

    #[test]
    fn test_current_period_key() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(current_period_key(today).to_string(), "2026-10");
    }

    #[test]
    fn test_read_original_document() {
        let document = r#"[
    {
        "valor": 100.0,
        "cliente": "Ana"
    },
    {
        "valor": 50.5,
        "cliente": "João"
    },
    {
        "valor": 7,
        "cliente": "Ana"
    }
]"#;
        assert_eq!(
            read_records(document.as_bytes(), "vendas_2024-01.json"),
            LoadOutcome::Found(vec![
                SaleRecord {
                    amount: dec!(100),
                    client: "Ana".to_owned()
                },
                SaleRecord {
                    amount: dec!(50.5),
                    client: "João".to_owned()
                },
                SaleRecord {
                    amount: dec!(7),
                    client: "Ana".to_owned()
                },
            ])
        );
    }

    #[test]
    fn test_read_empty_and_corrupt() {
        assert_eq!(read_records(&b""[..], "x"), LoadOutcome::Empty);
        assert_eq!(read_records(&b"  \n"[..], "x"), LoadOutcome::Empty);
        assert!(matches!(
            read_records(&b"{not json"[..], "x"),
            LoadOutcome::Corrupt(_)
        ));
        assert!(matches!(
            read_records(&br#"[{"cliente": "Ana"}]"#[..], "x"),
            LoadOutcome::Corrupt(_)
        ));
        assert_eq!(
            read_records(&b"[]"[..], "x"),
            LoadOutcome::Found(Vec::new())
        );
    }

    #[test]
    fn test_outcome_presents_as_empty() {
        for outcome in [
            LoadOutcome::Missing,
            LoadOutcome::Empty,
            LoadOutcome::Corrupt("bad".to_owned()),
            LoadOutcome::Unreadable("denied".to_owned()),
        ] {
            assert!(outcome.clone().records().is_empty());
            assert_eq!(outcome.exists(), outcome != LoadOutcome::Missing);
            assert_eq!(outcome.notice().is_some(), outcome != LoadOutcome::Missing);
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let ledgers = JsonLedgers::new(dir.path());
        assert_eq!(ledgers.load(period()), LoadOutcome::Missing);
        assert!(!ledgers.exists(period()));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let ledgers = JsonLedgers::new(dir.path());
        let records = vec![
            SaleRecord {
                amount: dec!(100.0),
                client: "Ana".to_owned(),
            },
            SaleRecord {
                amount: dec!(50.5),
                client: "Bia".to_owned(),
            },
            SaleRecord {
                amount: dec!(0),
                client: "Ana".to_owned(),
            },
        ];
        ledgers.save(period(), &records).unwrap();
        assert!(ledgers.exists(period()));
        assert!(dir.path().join("vendas_2024-01.json").is_file());
        assert_eq!(ledgers.load(period()), LoadOutcome::Found(records));
    }

    #[test]
    fn test_save_overwrites_whole_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledgers = JsonLedgers::new(dir.path());
        let first = vec![SaleRecord {
            amount: dec!(1),
            client: "Ana".to_owned(),
        }];
        ledgers.save(period(), &first).unwrap();
        ledgers.save(period(), &[]).unwrap();
        assert_eq!(ledgers.load(period()), LoadOutcome::Found(Vec::new()));
    }

    #[test]
    fn test_corrupt_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let ledgers = JsonLedgers::new(dir.path());
        std::fs::write(ledgers.path_for(period()), "[{\"valor\": ").unwrap();
        let outcome = ledgers.load(period());
        assert!(matches!(outcome, LoadOutcome::Corrupt(_)));
        assert!(outcome.exists());
    }
}
