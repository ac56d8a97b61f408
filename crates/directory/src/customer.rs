use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storders_core::CustomerId;

/// A customer of the distributor (a purchasing company plus its contact).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a new customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Partial update: `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPatch {
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl Customer {
    /// Materialize a customer record from registration input.
    pub fn create(id: CustomerId, new: NewCustomer, now: DateTime<Utc>) -> Self {
        Self {
            id,
            company_name: new.company_name,
            contact_name: new.contact_name,
            contact_email: new.contact_email,
            phone: new.phone,
            address: new.address,
            city: new.city,
            country: new.country,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update; absent fields keep their current value.
    pub fn apply(&mut self, patch: CustomerPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.company_name {
            self.company_name = v;
        }
        if let Some(v) = patch.contact_name {
            self.contact_name = v;
        }
        if let Some(v) = patch.contact_email {
            self.contact_email = v;
        }
        if let Some(v) = patch.phone {
            self.phone = Some(v);
        }
        if let Some(v) = patch.address {
            self.address = Some(v);
        }
        if let Some(v) = patch.city {
            self.city = Some(v);
        }
        if let Some(v) = patch.country {
            self.country = Some(v);
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Customer {
        Customer::create(
            CustomerId::new(),
            NewCustomer {
                company_name: "TechFusion GmbH".to_string(),
                contact_name: "Klaus Weber".to_string(),
                contact_email: "k.weber@techfusion.de".to_string(),
                phone: None,
                address: None,
                city: Some("Munich".to_string()),
                country: Some("Germany".to_string()),
            },
            Utc::now(),
        )
    }

    #[test]
    fn patch_updates_only_supplied_fields() {
        let mut customer = sample();
        let before = customer.clone();

        customer.apply(
            CustomerPatch {
                contact_name: Some("Greta Weber".to_string()),
                phone: Some("+49-89-555-0101".to_string()),
                ..Default::default()
            },
            Utc::now(),
        );

        assert_eq!(customer.contact_name, "Greta Weber");
        assert_eq!(customer.phone.as_deref(), Some("+49-89-555-0101"));
        assert_eq!(customer.company_name, before.company_name);
        assert_eq!(customer.country, before.country);
        assert_eq!(customer.created_at, before.created_at);
    }

    #[test]
    fn empty_patch_still_bumps_updated_at() {
        let mut customer = sample();
        let later = customer.updated_at + chrono::Duration::seconds(5);

        customer.apply(CustomerPatch::default(), later);

        assert_eq!(customer.updated_at, later);
    }
}
