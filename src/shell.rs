use crate::{
    compute::{compare_months, Outcome, Report},
    data::{Error, PeriodKey, SaleRecord},
    format::format_money,
    read::{current_period_key, file_name, LedgerStore, LoadOutcome},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::{
    io::{self, BufRead, Write},
    str::FromStr,
};

/// Typed by the user instead of a client name to stop adding sales.
pub const DONE_SENTINEL: &str = "sair";

/// Menu entries, numbered as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuChoice {
    Add,
    List,
    Delete,
    ReportCurrent,
    ReportOther,
    Compare,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use MenuChoice::*;
        Ok(match s.trim() {
            "1" => Add,
            "2" => List,
            "3" => Delete,
            "4" => ReportCurrent,
            "5" => ReportOther,
            "6" => Compare,
            "7" => Exit,
            _ => return Err(()),
        })
    }
}

/// State shared by the flows of one menu round. Rebuilt at the top of every
/// round so a session left open across midnight of the last day of a month
/// moves on to the new month.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Session {
    pub period: PeriodKey,
}

/// Plain decimals, or scientific notation such as `1e3`.
pub(crate) fn parse_amount(input: &str) -> Result<Decimal, Error> {
    let input = input.trim();
    Decimal::from_str(input)
        .or_else(|_| Decimal::from_scientific(input))
        .map_err(|_| Error::InvalidAmount)
}

/// Removes the sale at 1-based `input`, leaving the others in order.
pub(crate) fn remove_sale(records: &mut Vec<SaleRecord>, input: &str) -> Result<SaleRecord, Error> {
    let number: usize = input.trim().parse().map_err(|_| Error::InvalidIndex)?;
    if number == 0 || number > records.len() {
        return Err(Error::IndexOutOfRange);
    }
    Ok(records.remove(number - 1))
}

/// The interactive menu. Console, storage and clock come from outside so the
/// whole loop can be driven by a script.
pub(crate) struct Shell<S, R, W, C> {
    store: S,
    input: R,
    output: W,
    clock: C,
}

impl<S, R, W, C> Shell<S, R, W, C>
where
    S: LedgerStore,
    R: BufRead,
    W: Write,
    C: Fn() -> NaiveDate,
{
    pub fn new(store: S, input: R, output: W, clock: C) -> Self {
        Self {
            store,
            input,
            output,
            clock,
        }
    }

    /// Runs until the user exits or the input ends. Only console failures
    /// get out of here as errors.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.show_menu()?;
            let Some(line) = self.prompt("Escolha uma opção: ")? else {
                break;
            };
            let session = Session {
                period: current_period_key((self.clock)()),
            };
            let Ok(choice) = line.parse::<MenuChoice>() else {
                self.say("Opção inválida. Tente novamente.")?;
                continue;
            };
            tracing::debug!("menu choice {choice:?} for {}", session.period);
            match choice {
                MenuChoice::Add => self.add_flow(session)?,
                MenuChoice::List => {
                    self.list_flow(session)?;
                }
                MenuChoice::Delete => self.delete_flow(session)?,
                MenuChoice::ReportCurrent => self.report_flow(session.period)?,
                MenuChoice::ReportOther => self.report_other_flow()?,
                MenuChoice::Compare => self.compare_flow()?,
                MenuChoice::Exit => {
                    self.say("Saindo do programa...")?;
                    break;
                }
            }
        }
        Ok(())
    }

    fn show_menu(&mut self) -> io::Result<()> {
        self.say(
            "\n===== MENU =====\n\
             1 - Adicionar novas vendas no mês atual\n\
             2 - Ver todas as vendas do mês atual\n\
             3 - Apagar uma venda do mês atual\n\
             4 - Ver relatório do mês atual\n\
             5 - Ver relatório de um mês específico\n\
             6 - Comparar dois meses\n\
             7 - Sair",
        )
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    /// Asks for one line, trimmed. `None` once the input is exhausted.
    fn prompt(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    fn load(&mut self, period: PeriodKey) -> io::Result<LoadOutcome> {
        let loaded = self.store.load(period);
        if let Some(notice) = loaded.notice() {
            self.say(&format!("{}: {notice}", file_name(period)))?;
        }
        Ok(loaded)
    }

    fn save(&mut self, period: PeriodKey, records: &[SaleRecord]) -> io::Result<bool> {
        match self.store.save(period, records) {
            Ok(()) => Ok(true),
            Err(e) => {
                self.say(&e.to_string())?;
                Ok(false)
            }
        }
    }

    fn ask_period(&mut self, question: &str) -> io::Result<Option<PeriodKey>> {
        let Some(line) = self.prompt(question)? else {
            return Ok(None);
        };
        match line.parse::<PeriodKey>() {
            Ok(period) => Ok(Some(period)),
            Err(e) => {
                self.say(&e.to_string())?;
                Ok(None)
            }
        }
    }

    fn add_flow(&mut self, session: Session) -> io::Result<()> {
        let mut records = self.load(session.period)?.records();
        let before = records.len();
        loop {
            let question = format!("Digite o nome do cliente (ou '{DONE_SENTINEL}' para finalizar): ");
            let Some(client) = self.prompt(&question)? else {
                break;
            };
            if client.to_lowercase() == DONE_SENTINEL {
                break;
            }
            let Some(amount) = self.prompt(&format!("Digite o valor da venda para {client}: "))?
            else {
                break;
            };
            match parse_amount(&amount).and_then(|amount| SaleRecord::new(&client, amount)) {
                Ok(record) => records.push(record),
                Err(e) => self.say(&e.to_string())?,
            }
        }
        if self.save(session.period, &records)? {
            tracing::info!("{} sales added to {}", records.len() - before, session.period);
        }
        Ok(())
    }

    /// Prints the month's sales and hands them back for further use.
    fn list_flow(&mut self, session: Session) -> io::Result<Vec<SaleRecord>> {
        let records = self.load(session.period)?.records();
        if records.is_empty() {
            self.say("\nNenhuma venda registrada neste período.")?;
            return Ok(records);
        }
        self.say("\n=== LISTA DE VENDAS ===")?;
        for (i, sale) in records.iter().enumerate() {
            let line = format!(
                "{}. Cliente: {} - Valor: {}",
                i + 1,
                sale.client,
                format_money(sale.amount)
            );
            self.say(&line)?;
        }
        Ok(records)
    }

    fn delete_flow(&mut self, session: Session) -> io::Result<()> {
        let mut records = self.list_flow(session)?;
        if records.is_empty() {
            return Ok(());
        }
        let Some(answer) = self.prompt("\nDigite o número da venda que deseja apagar: ")? else {
            return Ok(());
        };
        match remove_sale(&mut records, &answer) {
            Ok(removed) => {
                if self.save(session.period, &records)? {
                    self.say(&format!(
                        "\nVenda de {} para {} foi removida.",
                        format_money(removed.amount),
                        removed.client
                    ))?;
                }
            }
            Err(e) => self.say(&format!("\n{e}"))?,
        }
        Ok(())
    }

    fn report_flow(&mut self, period: PeriodKey) -> io::Result<()> {
        let records = self.load(period)?.records();
        let report = match Report::compute(&records) {
            Ok(Some(report)) => report,
            Ok(None) => return self.say("\nNenhuma venda registrada neste período."),
            Err(e) => return self.say(&format!("\n{e}")),
        };
        let lines = [
            "\n=== RELATÓRIO DE VENDAS ===".to_owned(),
            format!("Total de vendas: {}", format_money(report.total)),
            format!("Quantidade de vendas: {}", report.count),
            format!("Média de vendas: {}", format_money(report.average)),
            format!("Maior venda: {}", format_money(report.max)),
            format!("Menor venda: {}", format_money(report.min)),
            format!(
                "Cliente com mais pedidos: {} ({} pedidos)",
                report.top_by_frequency.client, report.top_by_frequency.count
            ),
            format!(
                "Cliente que mais gastou: {} ({})",
                report.top_by_spend.client,
                format_money(report.top_by_spend.total)
            ),
            format!("Comissão total do vendedor: {}", format_money(report.commission)),
        ];
        for line in lines {
            self.say(&line)?;
        }
        Ok(())
    }

    fn report_other_flow(&mut self) -> io::Result<()> {
        let Some(period) = self.ask_period("Digite o mês que deseja visualizar (YYYY-MM): ")?
        else {
            return Ok(());
        };
        if !self.store.exists(period) {
            return self.say("Nenhum relatório encontrado para esse período.");
        }
        self.report_flow(period)
    }

    fn compare_flow(&mut self) -> io::Result<()> {
        let Some(first) = self.ask_period("Digite o primeiro mês para comparação (YYYY-MM): ")?
        else {
            return Ok(());
        };
        let Some(second) = self.ask_period("Digite o segundo mês para comparação (YYYY-MM): ")?
        else {
            return Ok(());
        };
        let comparison = match compare_months(&self.store, first, second) {
            Ok(comparison) => comparison,
            Err(e) => return self.say(&format!("\n{e}")),
        };
        for month in [&comparison.first, &comparison.second] {
            if let Some(notice) = &month.load_notice {
                self.say(&format!("{}: {notice}", file_name(month.period)))?;
            }
        }
        self.say("\n=== COMPARAÇÃO DE MESES ===")?;
        for month in [&comparison.first, &comparison.second] {
            self.say(&format!("{}: {}", month.period, format_money(month.total)))?;
        }
        match comparison.outcome {
            Outcome::FirstGreater => self.say(&format!("O mês {first} teve mais vendas!")),
            Outcome::SecondGreater => self.say(&format!("O mês {second} teve mais vendas!")),
            Outcome::Equal => self.say("Ambos os meses tiveram o mesmo faturamento."),
        }
    }
}
