use serde::{Deserialize, Serialize};

use super::model::{Gender, LifeStatus};

/// Optional filter fields shared by the remote list query and the cache query.
///
/// Empty or whitespace-only strings are treated exactly like absent values;
/// use [`CharacterFilters::normalized`] (or the `with_*` builders) before
/// comparing two filter sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterFilters {
    pub name: Option<String>,
    pub status: Option<LifeStatus>,
    pub species: Option<String>,
    pub subtype: Option<String>,
    pub gender: Option<Gender>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl CharacterFilters {
    pub fn normalized(self) -> Self {
        Self {
            name: non_empty(self.name),
            status: self.status,
            species: non_empty(self.species),
            subtype: non_empty(self.subtype),
            gender: self.gender,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = non_empty(Some(name.into()));
        self
    }

    pub fn with_status(mut self, status: Option<LifeStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = non_empty(Some(species.into()));
        self
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = non_empty(Some(subtype.into()));
        self
    }

    pub fn with_gender(mut self, gender: Option<Gender>) -> Self {
        self.gender = gender;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clone().normalized() == CharacterFilters::default()
    }

    /// `(key, value)` pairs for the list endpoint, skipping absent fields.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let f = self.clone().normalized();
        let mut pairs = Vec::new();
        if let Some(name) = f.name {
            pairs.push(("name", name));
        }
        if let Some(status) = f.status {
            pairs.push(("status", status.as_query().to_string()));
        }
        if let Some(species) = f.species {
            pairs.push(("species", species));
        }
        if let Some(subtype) = f.subtype {
            pairs.push(("type", subtype));
        }
        if let Some(gender) = f.gender {
            pairs.push(("gender", gender.as_query().to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_strings_are_absent() {
        let filters = CharacterFilters {
            name: Some("  ".into()),
            species: Some(String::new()),
            subtype: Some("Parasite".into()),
            ..Default::default()
        };
        assert_eq!(
            filters.normalized(),
            CharacterFilters {
                subtype: Some("Parasite".into()),
                ..Default::default()
            }
        );
        assert!(CharacterFilters::default().with_name("").is_empty());
    }

    #[test]
    fn query_pairs_use_api_spelling() {
        let filters = CharacterFilters::default()
            .with_name("rick")
            .with_status(Some(LifeStatus::Alive))
            .with_subtype("Clone")
            .with_gender(Some(Gender::Male));
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("name", "rick".to_string()),
                ("status", "alive".to_string()),
                ("type", "Clone".to_string()),
                ("gender", "male".to_string()),
            ]
        );
    }
}
