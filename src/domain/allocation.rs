use std::collections::HashMap;

use tracing::debug;

use super::{Debit, InsufficientBalance, TransactionStore};

impl TransactionStore {
    /// Points that can be spent across all payers
    ///
    /// A payer whose adjustments outweigh their earnings contributes nothing.
    pub fn available(&self) -> i64 {
        self.balances().values().map(|balance| (*balance).max(0)).sum()
    }

    /// Spend points across all payers, oldest transaction first
    ///
    /// Returns one debit per payer touched, in the order they were first drawn from. Nothing is
    /// modified if the ledger does not hold enough points.
    ///
    /// # Panics
    ///
    /// Panics if `points` is not positive, or if the walk would leave a payer with a negative
    /// balance.
    pub fn spend(&mut self, points: i64) -> Result<Vec<Debit>, InsufficientBalance> {
        assert!(points > 0, "spend amount must be positive, got {points}");

        // Each payer can give up at most their current balance, so that adjustments without a
        // matching earning never push them below zero.
        let mut headroom: HashMap<String, i64> = self
            .balances()
            .into_iter()
            .map(|(payer, balance)| (payer, balance.max(0)))
            .collect();
        let available: i64 = headroom.values().sum();
        if points > available {
            return Err(InsufficientBalance {
                requested: points,
                available,
            });
        }

        let mut debits: Vec<Debit> = Vec::new();
        let mut left = points;
        for transaction in self.transactions_mut() {
            if left == 0 {
                break;
            }
            if !transaction.is_spendable() {
                continue;
            }

            let payer_headroom = headroom.entry(transaction.payer.clone()).or_default();
            let taken = transaction.remaining.min(left).min(*payer_headroom);
            if taken == 0 {
                continue;
            }

            transaction.remaining -= taken;
            *payer_headroom -= taken;
            left -= taken;
            debug!(
                transaction_id = %transaction.transaction_id,
                payer = %transaction.payer,
                taken,
                remaining = transaction.remaining,
                "points consumed"
            );

            match debits.iter_mut().find(|d| d.payer == transaction.payer) {
                Some(debit) => debit.points -= taken,
                None => debits.push(Debit::new(transaction.payer.clone(), -taken)),
            }
        }

        assert_eq!(left, 0, "allocation stopped with {left} points left");
        assert!(
            headroom.values().all(|h| *h >= 0),
            "allocation drove a payer balance negative"
        );

        Ok(debits)
    }
}
