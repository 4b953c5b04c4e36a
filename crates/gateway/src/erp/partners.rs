//! Partner (customer) record operations on `res.partner`.

use formbridge_core::{CountryId, Customer, PartnerId};
use serde_json::json;
use tracing::{debug, instrument};

use super::client::ErpClient;
use super::types::{NewPartner, PartnerRef};
use super::ErpError;

impl ErpClient {
    /// Find a partner by exact email match.
    ///
    /// # Errors
    ///
    /// Returns `ErpError` if the search call fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn find_partner_by_email(
        &self,
        email: &str,
    ) -> Result<Option<PartnerRef>, ErpError> {
        let rows: Vec<PartnerRef> = self
            .execute_kw(
                "res.partner",
                "search_read",
                json!([[["email", "=", email]]]),
                json!({"fields": ["id", "name", "email"], "limit": 1}),
            )
            .await?;

        Ok(rows.into_iter().next())
    }

    /// Create a partner record, returning its id.
    ///
    /// # Errors
    ///
    /// Returns `ErpError` if the create call fails.
    #[instrument(skip(self, partner), fields(name = %partner.name))]
    pub async fn create_partner(&self, partner: NewPartner) -> Result<PartnerId, ErpError> {
        let id: i32 = self
            .execute_kw(
                "res.partner",
                "create",
                json!([partner.into_values()]),
                json!({}),
            )
            .await?;

        Ok(PartnerId::new(id))
    }

    /// Find the partner matching a normalized customer by email, creating the
    /// record when none exists.
    ///
    /// The billing address goes on the partner record; the country name is
    /// resolved to a country id first (and silently dropped when the ERP does
    /// not know it).
    ///
    /// # Errors
    ///
    /// Returns `ErpError` if any remote call fails.
    #[instrument(skip(self, customer), fields(email = %customer.email))]
    pub async fn find_or_create_partner(
        &self,
        customer: &Customer,
    ) -> Result<PartnerId, ErpError> {
        if let Some(existing) = self.find_partner_by_email(customer.email.as_str()).await? {
            debug!(partner_id = existing.id, "Matched existing partner");
            return Ok(PartnerId::new(existing.id));
        }

        let billing = customer.billing.clone().unwrap_or_default();
        let country_id = match &billing.country {
            Some(name) => self.country_id(name).await?,
            None => None,
        };

        let partner = NewPartner {
            name: customer.name.clone(),
            email: customer.email.as_str().to_string(),
            phone: customer.phone.clone(),
            street: billing.street,
            street2: billing.street2,
            city: billing.city,
            zip: billing.zip,
            country_id,
        };

        let id = self.create_partner(partner).await?;
        debug!(partner_id = %id, "Created partner");
        Ok(id)
    }

    /// Resolve a country name to its remote id, case-insensitively.
    ///
    /// Results (including misses) are memoized in an in-memory cache, since
    /// the same handful of country names shows up on nearly every order.
    ///
    /// # Errors
    ///
    /// Returns `ErpError` if the lookup call fails. Cache hits never fail.
    #[instrument(skip(self))]
    pub async fn country_id(&self, name: &str) -> Result<Option<CountryId>, ErpError> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return Ok(None);
        }

        if let Some(cached) = self.inner.country_cache.get(&key).await {
            return Ok(cached.map(CountryId::new));
        }

        #[derive(serde::Deserialize)]
        struct CountryRow {
            id: i32,
        }

        let rows: Vec<CountryRow> = self
            .execute_kw(
                "res.country",
                "search_read",
                json!([[["name", "ilike", name.trim()]]]),
                json!({"fields": ["id"], "limit": 1}),
            )
            .await?;

        let resolved = rows.first().map(|row| row.id);
        self.inner.country_cache.insert(key, resolved).await;

        Ok(resolved.map(CountryId::new))
    }
}
