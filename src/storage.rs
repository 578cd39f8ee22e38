use anyhow::{Context, Result};
use mongodb::bson::doc;
use mongodb::{Client, Collection};
use tracing::info;

use crate::countries::COUNTRIES;
use crate::models::{CountryTrendsDocument, KeywordEntry};

const DATABASE: &str = "trending_keywords";
const COLLECTION: &str = "keywords";

/// Document-store handle. Connected once at startup and reused for the
/// process lifetime; usage is strictly sequential.
#[derive(Clone)]
pub struct TrendsStore {
    collection: Collection<CountryTrendsDocument>,
}

impl TrendsStore {
    pub async fn connect(uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .context("Failed to connect to the document store")?;
        let collection = client.database(DATABASE).collection(COLLECTION);
        info!("Connected to document store at {}/{}", DATABASE, COLLECTION);
        Ok(Self { collection })
    }

    /// Replace the country's snapshot: delete whatever document exists for
    /// the country code, then insert the fresh one. The two steps are not
    /// one transaction; a crash in between leaves the country without a
    /// document until the next successful cycle.
    pub async fn replace_country(
        &self,
        country_code: &str,
        country_name: &str,
        keywords: Vec<KeywordEntry>,
    ) -> Result<()> {
        let document = CountryTrendsDocument::new(country_code, country_name, keywords);

        self.collection
            .delete_many(doc! { "country_code": country_code }, None)
            .await
            .context("Failed to delete previous snapshot")?;

        self.collection
            .insert_one(&document, None)
            .await
            .context("Failed to insert new snapshot")?;

        info!(
            "Saved {} keywords for {} (UTC: {})",
            document.keywords.len(),
            country_name,
            document.timestamp
        );
        Ok(())
    }

    /// Every stored snapshot, sorted into the fixed country order the
    /// collector uses.
    pub async fn list_all(&self) -> Result<Vec<CountryTrendsDocument>> {
        let mut cursor = self
            .collection
            .find(None, None)
            .await
            .context("Failed to query snapshots")?;

        let mut documents = Vec::new();
        while cursor.advance().await? {
            documents.push(cursor.deserialize_current()?);
        }

        sort_by_country_order(&mut documents);
        info!("Loaded {} country snapshots", documents.len());
        Ok(documents)
    }

    /// One country's snapshot by code, case-insensitively.
    pub async fn find_by_country(
        &self,
        country_code: &str,
    ) -> Result<Option<CountryTrendsDocument>> {
        let code = country_code.to_uppercase();
        self.collection
            .find_one(doc! { "country_code": &code }, None)
            .await
            .context("Failed to query snapshot")
    }
}

/// Order documents by their country's position in the compiled-in table;
/// codes not in the table sort last.
pub fn sort_by_country_order(documents: &mut [CountryTrendsDocument]) {
    documents.sort_by_key(|document| country_position(&document.country_code));
}

fn country_position(code: &str) -> usize {
    COUNTRIES
        .iter()
        .position(|country| country.code == code)
        .unwrap_or(COUNTRIES.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(code: &str) -> CountryTrendsDocument {
        CountryTrendsDocument::new(code, code, Vec::new())
    }

    #[test]
    fn documents_sort_into_the_fixed_country_order() {
        let mut documents = vec![snapshot("KR"), snapshot("US"), snapshot("DE")];
        sort_by_country_order(&mut documents);
        let codes: Vec<&str> = documents
            .iter()
            .map(|d| d.country_code.as_str())
            .collect();
        assert_eq!(codes, vec!["US", "DE", "KR"]);
    }

    #[test]
    fn unknown_country_codes_sort_last() {
        let mut documents = vec![snapshot("ZZ"), snapshot("SG"), snapshot("US")];
        sort_by_country_order(&mut documents);
        let codes: Vec<&str> = documents
            .iter()
            .map(|d| d.country_code.as_str())
            .collect();
        assert_eq!(codes, vec!["US", "SG", "ZZ"]);
    }
}
