//! C4 ForwardingPlanner: a pure function from an intent to a `PayoutPlan`.
//! No I/O beyond the injected `DisplayAmountFormatter` presentation
//! boundary. Memo rules are transcribed bit-exact from `spec.md` §4.4 —
//! they appear in recipients' wallet history and are a stable contract.

use crate::db::intent_store::Destination;
use crate::db::intent_store::PaymentIntent;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TIP_MEMO_RE: Regex =
        Regex::new(r"^(.+?)\s*\+\s*([\d.]+)%\s*tip\s*=\s*(.+)$").expect("static regex is valid");
}

/// Presentation-layer boundary for converting a sat amount into the
/// merchant's display currency. Production wiring consults the Lightning
/// provider's exchange-rate RPC (`spec.md` §1 — explicitly out of scope
/// for this core); this trait exists so the memo-formatting rules can be
/// exercised deterministically in tests.
pub trait DisplayAmountFormatter: Send + Sync {
    fn format(&self, amount_sat: i64, currency: &str) -> String;
}

/// Formats to two decimal places with a small currency/symbol table.
/// Good enough for tests; not a real exchange-rate conversion.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDisplayAmountFormatter;

impl DisplayAmountFormatter for DefaultDisplayAmountFormatter {
    fn format(&self, amount_sat: i64, currency: &str) -> String {
        let symbol = match currency.to_ascii_uppercase().as_str() {
            "USD" => "$",
            "EUR" => "\u{20ac}",
            _ => "",
        };
        let units = amount_sat as f64 / 1000.0;
        if symbol.is_empty() {
            format!("{units:.2} {currency}")
        } else {
            format!("{symbol}{units:.2}")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipKind {
    UsernameTip,
    LnurlTip,
}

#[derive(Debug, Clone)]
pub struct BaseLeg {
    pub destination: Destination,
    pub amount_sat: i64,
    pub memo: String,
}

#[derive(Debug, Clone)]
pub struct TipLeg {
    pub handle: String,
    pub amount_sat: i64,
    pub kind: TipKind,
    pub memo: Option<String>,
    pub skip_reason: Option<String>,
}

impl TipLeg {
    pub fn is_skipped(&self) -> bool {
        self.skip_reason.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct PayoutPlan {
    pub base: BaseLeg,
    pub tips: Vec<TipLeg>,
}

fn is_bitcoin_currency(currency: &str) -> bool {
    matches!(currency.to_ascii_uppercase().as_str(), "BTC" | "SAT" | "SATS")
}

fn enhanced_memo(intent: &PaymentIntent, formatter: &dyn DisplayAmountFormatter) -> String {
    if let Some(memo) = intent.memo.as_deref() {
        if let Some(caps) = TIP_MEMO_RE.captures(memo) {
            if intent.tip_amount_sat > 0 && !intent.tip_recipients.is_empty() {
                let base_text = &caps[1];
                let percent = &caps[2];
                let total_text = &caps[3];

                let tip_text = if is_bitcoin_currency(&intent.display_currency) {
                    format!("{} sat", intent.tip_amount_sat)
                } else {
                    let display = intent.tip_amount_display.clone().unwrap_or_else(|| {
                        formatter.format(intent.tip_amount_sat, &intent.display_currency)
                    });
                    format!("{display} ({} sat)", intent.tip_amount_sat)
                };

                let split_word = if intent.tip_recipients.len() > 1 {
                    "split to"
                } else {
                    "to"
                };
                let recipient_list = intent
                    .tip_recipients
                    .iter()
                    .map(|r| r.handle.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");

                return format!(
                    "BlinkPOS: {base_text} + {percent}% tip = {total_text} | {tip_text} tip {split_word} {recipient_list}"
                );
            }
        }

        if memo.starts_with("BlinkPOS:") {
            return memo.to_string();
        }

        return format!("BlinkPOS: {memo}");
    }

    format!("BlinkPOS: {} sats", intent.base_amount_sat)
}

fn per_tip_memo(
    amount_sat: i64,
    index: usize,
    n: usize,
    intent: &PaymentIntent,
    formatter: &dyn DisplayAmountFormatter,
) -> String {
    let suffix = if n > 1 {
        format!(" ({}/{})", index + 1, n)
    } else {
        String::new()
    };

    if is_bitcoin_currency(&intent.display_currency) {
        format!("BlinkPOS Tip{suffix}: {amount_sat} sats")
    } else {
        let formatted = formatter.format(amount_sat, &intent.display_currency);
        format!("BlinkPOS Tip{suffix}: {formatted} ({amount_sat} sats)")
    }
}

/// Derives the payout plan: base leg first, then one tip leg per
/// recipient in their original order. Tip shares are normalised against
/// their sum (which need not be 100) and the last recipient absorbs the
/// floor-division remainder.
pub fn plan(
    intent: &PaymentIntent,
    formatter: &dyn DisplayAmountFormatter,
) -> anyhow::Result<PayoutPlan> {
    let destination = intent.destination()?;
    let memo = enhanced_memo(intent, formatter);

    let base = BaseLeg {
        destination,
        amount_sat: intent.base_amount_sat,
        memo,
    };

    let recipients = &intent.tip_recipients;
    let n = recipients.len();
    let total_share: f64 = recipients.iter().map(|r| r.share_percent).sum();

    let mut tips = Vec::with_capacity(n);
    let mut running_sat = 0i64;

    for (index, recipient) in recipients.iter().enumerate() {
        let is_last = index + 1 == n;
        let amount_sat = if is_last {
            intent.tip_amount_sat - running_sat
        } else if total_share > 0.0 {
            ((intent.tip_amount_sat as f64) * recipient.share_percent / total_share).floor() as i64
        } else {
            0
        };
        running_sat += amount_sat;

        let kind = if recipient.handle.ends_with("@npub.cash") {
            TipKind::LnurlTip
        } else {
            TipKind::UsernameTip
        };

        if amount_sat <= 0 {
            tips.push(TipLeg {
                handle: recipient.handle.clone(),
                amount_sat: amount_sat.max(0),
                kind,
                memo: None,
                skip_reason: Some("tip amount too small".to_string()),
            });
            continue;
        }

        let memo = per_tip_memo(amount_sat, index, n, intent, formatter);
        tips.push(TipLeg {
            handle: recipient.handle.clone(),
            amount_sat,
            kind,
            memo: Some(memo),
            skip_reason: None,
        });
    }

    Ok(PayoutPlan { base, tips })
}
