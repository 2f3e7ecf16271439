use async_trait::async_trait;

use super::screen::{ScreenScope, ViewModel};
use crate::domain::{CharacterFilters, Gender, LifeStatus};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FiltersState {
    pub filters: CharacterFilters,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FiltersIntent {
    NameChanged(String),
    StatusChanged(Option<LifeStatus>),
    SpeciesChanged(String),
    TypeChanged(String),
    GenderChanged(Option<Gender>),
    ApplyFilters,
    ResetFilters,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FiltersEffect {
    Apply(CharacterFilters),
}

/// Filter sheet: edits a draft and hands it to the list on apply.
pub struct FiltersViewModel {
    initial: CharacterFilters,
}

impl FiltersViewModel {
    pub fn new(current: CharacterFilters) -> Self {
        Self {
            initial: current.normalized(),
        }
    }
}

#[async_trait]
impl ViewModel for FiltersViewModel {
    type Intent = FiltersIntent;
    type State = FiltersState;
    type Effect = FiltersEffect;

    const NAME: &'static str = "filters";

    fn initial_state(&self) -> FiltersState {
        FiltersState {
            filters: self.initial.clone(),
        }
    }

    async fn handle(&mut self, intent: FiltersIntent, scope: &ScreenScope<Self>) {
        match intent {
            FiltersIntent::NameChanged(name) => {
                scope.update(|s| s.filters = s.filters.clone().with_name(name));
            }
            FiltersIntent::StatusChanged(status) => {
                scope.update(|s| s.filters.status = status);
            }
            FiltersIntent::SpeciesChanged(species) => {
                scope.update(|s| s.filters = s.filters.clone().with_species(species));
            }
            FiltersIntent::TypeChanged(subtype) => {
                scope.update(|s| s.filters = s.filters.clone().with_subtype(subtype));
            }
            FiltersIntent::GenderChanged(gender) => {
                scope.update(|s| s.filters.gender = gender);
            }
            FiltersIntent::ApplyFilters => {
                scope.emit(FiltersEffect::Apply(scope.state().filters));
            }
            FiltersIntent::ResetFilters => {
                scope.update(|s| s.filters = CharacterFilters::default());
                scope.emit(FiltersEffect::Apply(CharacterFilters::default()));
            }
        }
    }
}
