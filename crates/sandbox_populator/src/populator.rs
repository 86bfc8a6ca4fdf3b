//! The five-stage population pipeline.

use std::time::Instant;

use chrono::{Months, SecondsFormat, Utc};
use obp_client::types::{
    Balance, NewAccount, NewBank, NewFxRate, NewHistoricalTransaction, TransactionValue, User,
};
use obp_client::{ObpClient, OWNER_VIEW};
use rand::Rng;
use tokio::time::sleep;

use crate::businesses;
use crate::config::{PopulateRequest, PopulatorConfig};
use crate::ids;
use crate::report::{
    AccountRecord, BankRecord, CounterpartyRecord, FxRateRecord, PopulateReport, TransactionRecord,
};

/// The user the populated data belongs to. The username seeds bank naming;
/// the user id becomes the owner of every created account.
#[derive(Debug, Clone, PartialEq)]
pub struct UserIdentity {
    pub user_id: String,
    pub username: String,
}

impl From<&User> for UserIdentity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
        }
    }
}

/// Drives the population pipeline against one sandbox deployment.
///
/// Stages run strictly in order because later stages consume what earlier
/// ones recorded: banks, then accounts per bank, then counterparties, FX
/// rates and historical transactions. Each item is checked before it is
/// created, so re-running against the same sandbox converges instead of
/// duplicating.
pub struct SandboxPopulator {
    client: ObpClient,
    config: PopulatorConfig,
}

impl SandboxPopulator {
    pub fn new(client: ObpClient, config: PopulatorConfig) -> Self {
        Self { client, config }
    }

    /// Run the pipeline to completion and report everything that happened.
    ///
    /// Never fails as a whole: individual items that cannot be created are
    /// recorded in [`PopulateReport::errors`] and the run moves on.
    pub async fn run(&self, user: &UserIdentity, request: &PopulateRequest) -> PopulateReport {
        let started = Instant::now();
        tracing::info!("Populating sandbox for user {}", user.username);
        let mut report = PopulateReport::new();

        self.create_banks(user, request, &mut report).await;
        self.create_accounts(user, request, &mut report).await;
        if request.create_counterparties && !report.accounts.is_empty() {
            self.create_counterparties(request, &mut report).await;
        }
        if request.create_fx_rates && !report.banks.is_empty() {
            self.create_fx_rates(request, &mut report).await;
        }
        if request.create_transactions && report.accounts.len() >= 2 {
            self.create_transactions(request, &mut report).await;
        }

        tracing::info!(
            "Population finished in {:.2?}: {} items, {} errors",
            started.elapsed(),
            report.total_items(),
            report.errors.len()
        );
        report
    }

    /// Stage one: banks named `{prefix}.bnk.{i}`
    async fn create_banks(
        &self,
        user: &UserIdentity,
        request: &PopulateRequest,
        report: &mut PopulateReport,
    ) {
        let prefix = request
            .bank_id_prefix
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| ids::bank_id_prefix(&user.username));

        tracing::info!("Creating {} banks...", request.num_banks);
        for i in 1..=request.num_banks {
            let bank_id = ids::bank_id(&prefix, i);
            let bank_name = ids::bank_full_name(&user.username, i);
            let bank_code = ids::bank_code(i);

            if self.client.bank_exists(&bank_id).await {
                tracing::info!("Bank {} already exists, skipping", bank_id);
                report.banks.push(BankRecord {
                    bank_id,
                    bank_code,
                    full_name: bank_name,
                    existed: true,
                });
            } else {
                let new_bank = NewBank {
                    bank_id: bank_id.clone(),
                    full_name: bank_name,
                    short_name: ids::bank_short_name(i),
                    bank_code: Some(bank_code),
                    ..Default::default()
                };
                match self.client.create_bank(&new_bank).await {
                    Ok(bank) => {
                        tracing::info!("Created bank: {}", bank.bank_id);
                        report.banks.push(BankRecord {
                            bank_id: bank.bank_id,
                            bank_code: bank.bank_code,
                            full_name: bank.full_name,
                            existed: false,
                        });
                    }
                    Err(err) => {
                        let msg = format!("Failed to create bank {}: {}", bank_id, err);
                        tracing::error!("{}", msg);
                        report.errors.push(msg);
                    }
                }
            }

            sleep(self.config.item_delay).await;
        }
    }

    /// Stage two: `Account {j}` at every bank from stage one, owned by the
    /// requesting user with a zero opening balance
    async fn create_accounts(
        &self,
        user: &UserIdentity,
        request: &PopulateRequest,
        report: &mut PopulateReport,
    ) {
        tracing::info!(
            "Creating {} accounts per bank...",
            request.num_accounts_per_bank
        );
        let bank_ids: Vec<String> = report.banks.iter().map(|b| b.bank_id.clone()).collect();

        for bank_id in bank_ids {
            // One listing per bank covers the dedup check for all labels. A
            // failed listing degrades to "nothing exists yet".
            let existing = match self.client.accounts_at_bank(&bank_id).await {
                Ok(accounts) => {
                    tracing::debug!("Found {} existing accounts at {}", accounts.len(), bank_id);
                    accounts
                }
                Err(err) => {
                    tracing::warn!("Could not fetch existing accounts for {}: {}", bank_id, err);
                    Vec::new()
                }
            };

            for j in 1..=request.num_accounts_per_bank {
                let label = ids::account_label(j);

                if let Some(account) = existing.iter().find(|a| a.label == label) {
                    tracing::info!("Account \"{}\" already exists at {}, skipping", label, bank_id);
                    let currency = if account.currency.is_empty() {
                        request.currency.clone()
                    } else {
                        account.currency.clone()
                    };
                    report.accounts.push(AccountRecord {
                        account_id: account.id.clone(),
                        bank_id: bank_id.clone(),
                        label: account.label.clone(),
                        currency,
                        existed: true,
                    });
                } else {
                    let new_account = NewAccount {
                        label: label.clone(),
                        currency: request.currency.clone(),
                        balance: Balance {
                            amount: "0".to_string(),
                            currency: request.currency.clone(),
                        },
                        user_id: Some(user.user_id.clone()),
                        ..Default::default()
                    };
                    match self.client.create_account(&bank_id, &new_account).await {
                        Ok(account) => {
                            tracing::info!(
                                "Created account: {} at {}",
                                account.account_id,
                                bank_id
                            );
                            report.accounts.push(AccountRecord {
                                account_id: account.account_id,
                                bank_id: bank_id.clone(),
                                label: account.label,
                                currency: account.currency,
                                existed: false,
                            });
                        }
                        Err(err) => {
                            let msg = format!("Failed to create account at {}: {}", bank_id, err);
                            tracing::error!("{}", msg);
                            report.errors.push(msg);
                        }
                    }
                }
                sleep(self.config.item_delay).await;
            }
        }
    }

    /// Stage three: the first ten seed businesses as counterparties of the
    /// first account created
    async fn create_counterparties(
        &self,
        request: &PopulateRequest,
        report: &mut PopulateReport,
    ) {
        let first_account = match report.accounts.first() {
            Some(account) => account.clone(),
            None => return,
        };

        tracing::info!("Creating counterparties...");
        let existing = match self
            .client
            .counterparties(&first_account.bank_id, &first_account.account_id, OWNER_VIEW)
            .await
        {
            Ok(counterparties) => {
                tracing::debug!("Found {} existing counterparties", counterparties.len());
                counterparties
            }
            Err(err) => {
                tracing::warn!("Could not fetch existing counterparties: {}", err);
                Vec::new()
            }
        };

        for business in businesses::businesses(Some(10)) {
            let found = existing.iter().find(|cp| cp.name == business.name);
            match found {
                // A name match without an id is not trusted as existing;
                // the create below lets the sandbox arbitrate.
                Some(cp) if !cp.counterparty_id.is_empty() => {
                    tracing::info!("Counterparty \"{}\" already exists, skipping", business.name);
                    report.counterparties.push(CounterpartyRecord {
                        counterparty_id: cp.counterparty_id.clone(),
                        name: business.name.to_string(),
                        bank_id: first_account.bank_id.clone(),
                        account_id: first_account.account_id.clone(),
                        existed: true,
                    });
                }
                _ => {
                    let payload = businesses::counterparty_payload(business, &request.currency);
                    match self
                        .client
                        .create_counterparty(
                            &first_account.bank_id,
                            &first_account.account_id,
                            &payload,
                            OWNER_VIEW,
                        )
                        .await
                    {
                        Ok(counterparty) => {
                            tracing::info!("Created counterparty: {}", business.name);
                            report.counterparties.push(CounterpartyRecord {
                                counterparty_id: counterparty.counterparty_id,
                                name: business.name.to_string(),
                                bank_id: first_account.bank_id.clone(),
                                account_id: first_account.account_id.clone(),
                                existed: false,
                            });
                        }
                        Err(err) => {
                            let msg =
                                format!("Failed to create counterparty {}: {}", business.name, err);
                            tracing::error!("{}", msg);
                            report.errors.push(msg);
                        }
                    }
                }
            }
            sleep(self.config.item_delay).await;
        }
    }

    /// Stage four: both directions of every configured rate at every bank
    async fn create_fx_rates(&self, request: &PopulateRequest, report: &mut PopulateReport) {
        tracing::info!("Creating FX rates...");
        let bank_ids: Vec<String> = report.banks.iter().map(|b| b.bank_id.clone()).collect();

        for bank_id in &bank_ids {
            for entry in self.config.fx_table.entries() {
                // Both directions share one effective date, but succeed or
                // fail on their own.
                let effective_date = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

                let forward = NewFxRate {
                    from_currency_code: request.currency.clone(),
                    to_currency_code: entry.currency.clone(),
                    conversion_value: entry.rate,
                    inverse_conversion_value: None,
                    effective_date: Some(effective_date.clone()),
                };
                self.ensure_fx_rate(bank_id, &forward, entry.rate, report).await;
                sleep(self.config.fx_delay).await;

                let reverse = NewFxRate {
                    from_currency_code: entry.currency.clone(),
                    to_currency_code: request.currency.clone(),
                    conversion_value: 1.0 / entry.rate,
                    inverse_conversion_value: None,
                    effective_date: Some(effective_date),
                };
                self.ensure_fx_rate(bank_id, &reverse, round6(1.0 / entry.rate), report)
                    .await;
                sleep(self.config.fx_delay).await;
            }
        }
        tracing::info!("Created {} FX rates", report.fx_rates.len());
    }

    /// Probe one directional rate and create it if the probe came back
    /// empty. `recorded_rate` is what lands in the report on creation;
    /// pre-existing rates report whatever the sandbox returned.
    async fn ensure_fx_rate(
        &self,
        bank_id: &str,
        rate: &NewFxRate,
        recorded_rate: f64,
        report: &mut PopulateReport,
    ) {
        let from = &rate.from_currency_code;
        let to = &rate.to_currency_code;

        match self.client.fx_rate(bank_id, from, to).await {
            Some(existing) => {
                tracing::info!("FX rate {}→{} already exists at {}, skipping", from, to, bank_id);
                report.fx_rates.push(FxRateRecord {
                    bank_id: bank_id.to_string(),
                    from_currency: from.clone(),
                    to_currency: to.clone(),
                    rate: existing.conversion_value,
                    existed: true,
                });
            }
            None => match self.client.create_fx_rate(bank_id, rate).await {
                Ok(_) => {
                    report.fx_rates.push(FxRateRecord {
                        bank_id: bank_id.to_string(),
                        from_currency: from.clone(),
                        to_currency: to.clone(),
                        rate: recorded_rate,
                        existed: false,
                    });
                }
                Err(err) => {
                    let msg = format!("FX rate {}→{} at {}: {}", from, to, bank_id, err);
                    tracing::error!("{}", msg);
                    report.errors.push(msg);
                }
            },
        }
    }

    /// Stage five: a year of monthly transfers between random distinct
    /// account pairs, per bank
    async fn create_transactions(&self, request: &PopulateRequest, report: &mut PopulateReport) {
        tracing::info!("Creating historical transactions...");
        let grouped = group_accounts_by_bank(&report.accounts);
        let now = Utc::now();

        for (bank_id, account_ids) in grouped {
            // Transfers need two endpoints at the same bank
            if account_ids.len() < 2 {
                continue;
            }

            let existing = match self
                .client
                .transactions_for_account(&bank_id, &account_ids[0], OWNER_VIEW)
                .await
            {
                Ok(transactions) => {
                    tracing::debug!(
                        "Found {} existing transactions for account {}",
                        transactions.len(),
                        account_ids[0]
                    );
                    transactions
                }
                Err(err) => {
                    tracing::warn!("Could not fetch existing transactions: {}", err);
                    Vec::new()
                }
            };

            for month in 0..12u32 {
                let date = now.checked_sub_months(Months::new(month)).unwrap_or(now);
                let date_str = date.to_rfc3339_opts(SecondsFormat::Secs, true);
                let description = ids::transfer_description(month);

                if let Some(txn) = existing.iter().find(|t| t.details.description == description) {
                    tracing::info!(
                        "Transaction \"{}\" already exists at {}, skipping",
                        description,
                        bank_id
                    );
                    let amount = if txn.details.value.amount.is_empty() {
                        "0"
                    } else {
                        &txn.details.value.amount
                    };
                    let currency = if txn.details.value.currency.is_empty() {
                        &request.currency
                    } else {
                        &txn.details.value.currency
                    };
                    report.transactions.push(TransactionRecord {
                        transaction_id: txn.transaction_id.clone(),
                        bank_id: bank_id.clone(),
                        from_account_id: account_ids[0].clone(),
                        to_account_id: account_ids.get(1).unwrap_or(&account_ids[0]).clone(),
                        amount: format!("{} {}", amount, currency),
                        existed: true,
                    });
                    continue;
                }

                // ThreadRng stays inside this block so the future holds no
                // rng across await points
                let (from_idx, to_idx, amount) = {
                    let mut rng = rand::thread_rng();
                    let from_idx = rng.gen_range(0..account_ids.len());
                    let mut to_idx = rng.gen_range(0..account_ids.len());
                    while to_idx == from_idx {
                        to_idx = rng.gen_range(0..account_ids.len());
                    }
                    let amount = format!("{:.2}", rng.gen_range(100.0..1100.0));
                    (from_idx, to_idx, amount)
                };

                let new_txn = NewHistoricalTransaction {
                    from_account_id: account_ids[from_idx].clone(),
                    to_account_id: account_ids[to_idx].clone(),
                    value: TransactionValue {
                        currency: request.currency.clone(),
                        amount: amount.clone(),
                    },
                    description,
                    posted: date_str.clone(),
                    completed: date_str,
                    ..Default::default()
                };
                match self
                    .client
                    .create_historical_transaction(&bank_id, &new_txn)
                    .await
                {
                    Ok(txn) => {
                        report.transactions.push(TransactionRecord {
                            transaction_id: txn.transaction_id,
                            bank_id: bank_id.clone(),
                            from_account_id: account_ids[from_idx].clone(),
                            to_account_id: account_ids[to_idx].clone(),
                            amount: format!("{} {}", amount, request.currency),
                            existed: false,
                        });
                    }
                    Err(err) => {
                        let msg = format!("Transaction at {}: {}", bank_id, err);
                        tracing::error!("{}", msg);
                        report.errors.push(msg);
                    }
                }
                sleep(self.config.item_delay).await;
            }
        }
        tracing::info!("Created {} historical transactions", report.transactions.len());
    }
}

/// Group account ids by bank, preserving the order banks first appeared in
fn group_accounts_by_bank(accounts: &[AccountRecord]) -> Vec<(String, Vec<String>)> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for account in accounts {
        match grouped.iter_mut().find(|(bank_id, _)| *bank_id == account.bank_id) {
            Some((_, ids)) => ids.push(account.account_id.clone()),
            None => grouped.push((account.bank_id.clone(), vec![account.account_id.clone()])),
        }
    }
    grouped
}

/// Six decimal places is the precision reported for derived reverse rates
fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
