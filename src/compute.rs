use crate::{
    data::{Error, PeriodKey, SaleRecord},
    read::LedgerStore,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::{cmp::Ordering, collections::HashMap};

/// Seller's commission on a month's total.
pub const COMMISSION_RATE: Decimal = dec!(0.03);

/// Per-client running totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClientStats {
    pub client: String,
    pub count: usize,
    pub total: Decimal,
}

/// Client tallies in the order clients first appear in the ledger. The order is
/// what makes ties predictable: the earliest client wins, so the lookup map
/// only points into `clients` and is never iterated.
#[derive(Debug, Default)]
pub(crate) struct ClientTally {
    clients: Vec<ClientStats>,
    index: HashMap<String, usize>,
}

impl ClientTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[SaleRecord]) -> Result<Self, Error> {
        let mut tally = ClientTally::new();
        for record in records {
            tally.add(record)?;
        }
        Ok(tally)
    }

    pub fn add(&mut self, record: &SaleRecord) -> Result<(), Error> {
        let pos = match self.index.get(&record.client) {
            Some(&pos) => pos,
            None => {
                self.clients.push(ClientStats {
                    client: record.client.clone(),
                    count: 0,
                    total: Decimal::ZERO,
                });
                self.index
                    .insert(record.client.clone(), self.clients.len() - 1);
                self.clients.len() - 1
            }
        };
        let stats = &mut self.clients[pos];
        stats.total = stats
            .total
            .checked_add(record.amount)
            .ok_or(Error::TotalOverflow)?;
        stats.count += 1;
        Ok(())
    }

    pub fn top_by_frequency(&self) -> Option<&ClientStats> {
        self.first_max_by(|a, b| a.count.cmp(&b.count))
    }

    pub fn top_by_spend(&self) -> Option<&ClientStats> {
        self.first_max_by(|a, b| a.total.cmp(&b.total))
    }

    // `Iterator::max_by` keeps the last of equal elements, we want the first.
    fn first_max_by<F>(&self, cmp: F) -> Option<&ClientStats>
    where
        F: Fn(&ClientStats, &ClientStats) -> Ordering,
    {
        self.clients.iter().fold(None, |best, candidate| match best {
            Some(best) if cmp(candidate, best) != Ordering::Greater => Some(best),
            _ => Some(candidate),
        })
    }
}

/// Statistics over one month's sales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Report {
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
    pub max: Decimal,
    pub min: Decimal,
    pub top_by_frequency: ClientStats,
    pub top_by_spend: ClientStats,
    pub commission: Decimal,
}

impl Report {
    /// `Ok(None)` when there is nothing to report on; averages and extremes
    /// are never computed for an empty ledger.
    pub fn compute(records: &[SaleRecord]) -> Result<Option<Self>, Error> {
        if records.is_empty() {
            return Ok(None);
        }
        let total = sum(records)?;
        let count = records.len();
        let tally = ClientTally::from_records(records)?;
        let (Some(top_by_frequency), Some(top_by_spend)) =
            (tally.top_by_frequency(), tally.top_by_spend())
        else {
            return Ok(None);
        };
        let amounts = || records.iter().map(|r| r.amount);
        Ok(Some(Self {
            total,
            count,
            average: total / Decimal::from(count),
            max: amounts().max().unwrap_or(Decimal::ZERO),
            min: amounts().min().unwrap_or(Decimal::ZERO),
            top_by_frequency: top_by_frequency.clone(),
            top_by_spend: top_by_spend.clone(),
            commission: total * COMMISSION_RATE,
        }))
    }
}

/// Total of all amounts; fails instead of panicking when it does not fit a
/// `Decimal`.
pub(crate) fn sum(records: &[SaleRecord]) -> Result<Decimal, Error> {
    records.iter().try_fold(Decimal::ZERO, |total, r| {
        total.checked_add(r.amount).ok_or(Error::TotalOverflow)
    })
}

/// Which of two compared months sold more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    FirstGreater,
    SecondGreater,
    Equal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonthTotal {
    pub period: PeriodKey,
    pub total: Decimal,
    /// Set when the month's storage was there but could not be used.
    pub load_notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Comparison {
    pub first: MonthTotal,
    pub second: MonthTotal,
    pub outcome: Outcome,
}

fn month_total<S: LedgerStore>(store: &S, period: PeriodKey) -> Result<MonthTotal, Error> {
    let loaded = store.load(period);
    let load_notice = loaded.notice();
    Ok(MonthTotal {
        period,
        total: sum(&loaded.records())?,
        load_notice,
    })
}

/// Totals of two months side by side. Missing months count as zero.
pub(crate) fn compare_months<S: LedgerStore>(
    store: &S,
    first: PeriodKey,
    second: PeriodKey,
) -> Result<Comparison, Error> {
    let first = month_total(store, first)?;
    let second = month_total(store, second)?;
    let outcome = match first.total.cmp(&second.total) {
        Ordering::Greater => Outcome::FirstGreater,
        Ordering::Less => Outcome::SecondGreater,
        Ordering::Equal => Outcome::Equal,
    };
    Ok(Comparison {
        first,
        second,
        outcome,
    })
}
