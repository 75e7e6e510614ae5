use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Child, Draft, Entity, Patchable, Reference};
use crate::database::record::{dates, RecordError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "cash")]
    Cash,
    #[serde(rename = "credit card")]
    CreditCard,
    #[serde(rename = "bank transfer")]
    BankTransfer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub child_id: Uuid,
    pub amount: f64,
    #[serde(with = "dates")]
    pub date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
}

impl Entity for Payment {
    const COLLECTION: &'static str = "payments";
    const LABEL: &'static str = "Payment";

    fn references(&self) -> Vec<Reference> {
        vec![Reference::to::<Child>(self.child_id)]
    }
}

fn check_amount(amount: f64) -> Result<f64, RecordError> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(RecordError::invalid("amount", "must be a finite number"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub child_id: Option<Uuid>,
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "dates::option::deserialize")]
    pub date: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
}

impl Draft for NewPayment {
    type Entity = Payment;

    fn validate(self) -> Result<Payment, RecordError> {
        let present = [
            ("childId", self.child_id.is_some()),
            ("amount", self.amount.is_some()),
            ("date", self.date.is_some()),
            ("paymentMethod", self.payment_method.is_some()),
        ];
        let (Some(child_id), Some(amount), Some(date), Some(payment_method)) =
            (self.child_id, self.amount, self.date, self.payment_method)
        else {
            return Err(RecordError::missing(&present));
        };
        Ok(Payment {
            child_id,
            amount: check_amount(amount)?,
            date,
            payment_method,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPatch {
    pub child_id: Option<Uuid>,
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "dates::option::deserialize")]
    pub date: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
}

impl Patchable for Payment {
    type Patch = PaymentPatch;

    fn apply(&mut self, patch: PaymentPatch) -> Result<(), RecordError> {
        if let Some(child_id) = patch.child_id {
            self.child_id = child_id;
        }
        if let Some(amount) = patch.amount {
            self.amount = check_amount(amount)?;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(payment_method) = patch.payment_method {
            self.payment_method = payment_method;
        }
        Ok(())
    }
}
