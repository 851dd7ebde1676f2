//! C5 PayoutExecutor: walks a `PayoutPlan` leg by leg against the
//! `adapters` boundary. Base leg first; its outcome decides `Release`
//! vs `Complete` (`spec.md` §4.5). Tip legs only run once the base leg
//! has succeeded, and a tip failure never undoes the base payout — it
//! just surfaces as a partial success in the reported outcome.

use crate::adapters::InvoiceIssuer;
use crate::adapters::LnurlResolver;
use crate::adapters::NwcClient;
use crate::adapters::PaymentProviderAdapter;
use crate::adapters::UsernameResolver;
use crate::db::intent_store::Destination;
use crate::planner::BaseLeg;
use crate::planner::PayoutPlan;
use crate::planner::TipKind;
use crate::planner::TipLeg;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LegOutcome {
    pub label: String,
    pub amount_sat: i64,
    pub skipped: bool,
    pub success: bool,
    pub preimage: Option<String>,
    pub error: Option<String>,
}

impl LegOutcome {
    fn skipped(label: String, reason: String) -> Self {
        Self {
            label,
            amount_sat: 0,
            skipped: true,
            success: true,
            preimage: None,
            error: Some(reason),
        }
    }

    fn succeeded(label: String, amount_sat: i64, preimage: String) -> Self {
        Self {
            label,
            amount_sat,
            skipped: false,
            success: true,
            preimage: Some(preimage),
            error: None,
        }
    }

    fn failed(label: String, amount_sat: i64, error: String) -> Self {
        Self {
            label,
            amount_sat,
            skipped: false,
            success: false,
            preimage: None,
            error: Some(error),
        }
    }
}

/// The outcome of executing a whole plan, shaped for both the Claimer
/// (does the intent move to `Completed` or stay released?) and the
/// `GET /forward/status/:payment_hash` surface.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub base: LegOutcome,
    pub tips: Vec<LegOutcome>,
}

impl PlanOutcome {
    /// The base leg succeeding is what moves an intent to `Completed`;
    /// tip outcomes never gate this.
    pub fn success(&self) -> bool {
        self.base.success
    }

    /// At least one non-skipped tip leg failed while the base succeeded.
    pub fn partial_success(&self) -> bool {
        self.base.success && self.tips.iter().any(|t| !t.skipped && !t.success)
    }

    pub fn as_summary_json(&self) -> serde_json::Value {
        let leg_json = |leg: &LegOutcome| {
            serde_json::json!({
                "label": leg.label,
                "amount_sat": leg.amount_sat,
                "skipped": leg.skipped,
                "success": leg.success,
                "preimage": leg.preimage,
                "error": leg.error,
            })
        };

        serde_json::json!({
            "base": leg_json(&self.base),
            "tips": self.tips.iter().map(leg_json).collect::<Vec<_>>(),
            "success": self.success(),
            "partial_success": self.partial_success(),
        })
    }
}

pub struct PayoutExecutor {
    pub payment_provider: Arc<dyn PaymentProviderAdapter>,
    pub invoice_issuer: Arc<dyn InvoiceIssuer>,
    pub lnurl_resolver: Arc<dyn LnurlResolver>,
    pub nwc_client: Arc<dyn NwcClient>,
    pub username_resolver: Arc<dyn UsernameResolver>,
    /// Cap on routing fee the provider may spend per leg, as a
    /// percentage of the leg's own amount.
    pub max_fee_percent: f64,
}

impl PayoutExecutor {
    fn max_fee_sat(&self, amount_sat: i64) -> i64 {
        ((amount_sat as f64) * self.max_fee_percent / 100.0).ceil() as i64
    }

    async fn resolve_invoice(
        &self,
        destination: &Destination,
        amount_sat: i64,
        memo: &str,
    ) -> anyhow::Result<String> {
        match destination {
            Destination::ApiKey { wallet_id, .. } => {
                self.invoice_issuer
                    .issue_invoice(wallet_id, amount_sat, memo)
                    .await
            }
            Destination::LnAddress { username, wallet_id } => {
                // Resolve username -> BTC wallet id via the provider's
                // public lookup, falling back to the stored id on lookup
                // failure (`spec.md` §4.5).
                let resolved_wallet_id = match self.username_resolver.resolve_wallet_id(username).await {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        tracing::warn!(
                            username,
                            error = %e,
                            "ln_address username lookup failed, falling back to stored wallet id"
                        );
                        wallet_id.clone()
                    }
                };
                self.invoice_issuer
                    .issue_invoice(&resolved_wallet_id, amount_sat, memo)
                    .await
            }
            Destination::NpubCash { address } => {
                self.lnurl_resolver.resolve(address, amount_sat, memo).await
            }
            Destination::Nwc { encrypted_uri } => {
                self.nwc_client
                    .request_invoice(encrypted_uri, amount_sat, memo)
                    .await
            }
        }
    }

    async fn pay_base(&self, base: &BaseLeg) -> LegOutcome {
        let label = "base".to_string();
        if base.amount_sat <= 0 {
            return LegOutcome::failed(label, base.amount_sat, "base amount is not positive".to_string());
        }

        let invoice = match self
            .resolve_invoice(&base.destination, base.amount_sat, &base.memo)
            .await
        {
            Ok(invoice) => invoice,
            Err(e) => return LegOutcome::failed(label, base.amount_sat, format!("{e:#}")),
        };

        match self
            .payment_provider
            .pay_invoice(&invoice, self.max_fee_sat(base.amount_sat))
            .await
        {
            Ok(receipt) => LegOutcome::succeeded(label, base.amount_sat, receipt.preimage),
            Err(e) => LegOutcome::failed(label, base.amount_sat, format!("{e:#}")),
        }
    }

    async fn pay_tip(&self, tip: &TipLeg) -> LegOutcome {
        if tip.is_skipped() {
            return LegOutcome::skipped(
                tip.handle.clone(),
                tip.skip_reason.clone().unwrap_or_default(),
            );
        }

        let memo = tip.memo.clone().unwrap_or_default();

        // `UsernameTip` goes through the provider-native invoice-on-behalf-of
        // path; `LnurlTip` resolves via LNURL-pay. `spec.md` §4.5's tip
        // adapter table.
        let invoice = match tip.kind {
            TipKind::UsernameTip => {
                self.invoice_issuer
                    .issue_invoice_for_username(&tip.handle, tip.amount_sat, &memo)
                    .await
            }
            TipKind::LnurlTip => self.lnurl_resolver.resolve(&tip.handle, tip.amount_sat, &memo).await,
        };
        let invoice = match invoice {
            Ok(invoice) => invoice,
            Err(e) => return LegOutcome::failed(tip.handle.clone(), tip.amount_sat, format!("{e:#}")),
        };

        match self
            .payment_provider
            .pay_invoice(&invoice, self.max_fee_sat(tip.amount_sat))
            .await
        {
            Ok(receipt) => LegOutcome::succeeded(tip.handle.clone(), tip.amount_sat, receipt.preimage),
            Err(e) => LegOutcome::failed(tip.handle.clone(), tip.amount_sat, format!("{e:#}")),
        }
    }

    /// Executes every leg of `plan`. Tip legs run sequentially and only
    /// if the base leg succeeded — a failed base means there's nothing
    /// to tip on top of (`spec.md` §4.5).
    pub async fn execute(&self, plan: &PayoutPlan) -> PlanOutcome {
        let base_outcome = self.pay_base(&plan.base).await;

        let mut tips = Vec::with_capacity(plan.tips.len());
        if base_outcome.success {
            for tip in &plan.tips {
                tips.push(self.pay_tip(tip).await);
            }
        } else {
            for tip in &plan.tips {
                tips.push(LegOutcome::skipped(
                    tip.handle.clone(),
                    "base leg failed, tip not attempted".to_string(),
                ));
            }
        }

        PlanOutcome {
            base: base_outcome,
            tips,
        }
    }
}
