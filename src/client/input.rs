use crate::query_engine::Algorithm;

/// What the query field does with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Submit the form. The key itself is swallowed.
    Submit,
    /// The key edited the field.
    Edited,
    /// Not handled here.
    Ignored,
}

/// The query text field.
#[derive(Debug, Clone, Default)]
pub struct QueryInput {
    value: String,
}

impl QueryInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Handles one key event named the way browsers name them (`"Enter"`, `"Backspace"`, `"a"`).
    pub fn handle_key(&mut self, key: &str) -> KeyAction {
        match key {
            "Enter" => KeyAction::Submit,
            "Backspace" => {
                self.value.pop();
                KeyAction::Edited
            }
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => {
                        self.value.push(c);
                        KeyAction::Edited
                    }
                    _ => KeyAction::Ignored,
                }
            }
        }
    }
}

/// Drop-down of retrieval models.
#[derive(Debug, Clone)]
pub struct AlgorithmSelector {
    selected: Algorithm,
}

impl AlgorithmSelector {
    pub fn new(selected: Algorithm) -> Self {
        Self { selected }
    }

    pub fn options(&self) -> &'static [Algorithm] {
        &Algorithm::ALL
    }

    pub fn selected(&self) -> Algorithm {
        self.selected
    }

    /// Changes the selection to the option whose value is `value`. Unknown values leave
    /// the selection alone and return `false`.
    pub fn select(&mut self, value: &str) -> bool {
        match self.options().iter().find(|a| a.code() == value) {
            Some(&algorithm) => {
                self.selected = algorithm;
                log::info!("selected algorithm: {}", algorithm);
                true
            }
            None => {
                log::warn!("unknown algorithm option: {value:?}");
                false
            }
        }
    }
}

impl Default for AlgorithmSelector {
    fn default() -> Self {
        Self::new(Algorithm::Boolean)
    }
}

/// The values a submit sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    pub query: String,
    pub algorithm: String,
}

impl SearchForm {
    pub fn new(query: impl Into<String>, algorithm: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            algorithm: algorithm.into(),
        }
    }

    pub fn collect(input: &QueryInput, selector: &AlgorithmSelector) -> Self {
        Self::new(input.value(), selector.selected().code())
    }
}
