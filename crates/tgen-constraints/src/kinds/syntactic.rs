use crate::constraint::{Constraint, ConstraintKind, ConstraintLevel, clamp_weight, content_hash};
use crate::mask::{TokenId, TokenMask};
use crate::state::GenerationState;
use crate::vocab::{self, Vocabulary};
use rustc_hash::FxHashSet;
use tracing::trace;

/// Bracket structure and explicit grammar.
///
/// With bracket balancing on, a token is illegal when it closes a bracket
/// that is not the innermost open one (`(]`) or closes one that was never
/// opened. Brackets inside string literals are ignored. Tokens whose text
/// is listed as forbidden are always illegal.
///
/// The grammar, when given, is reported through `to_grammar` for hosts
/// with a grammar-constrained decoder; the mask does not interpret it.
#[derive(Clone, Debug)]
pub struct SyntacticConstraint {
    name: String,
    grammar: Option<String>,
    balance_brackets: bool,
    forbidden_texts: Vec<String>,
    weight: f32,
}

impl SyntacticConstraint {
    pub fn new(name: impl Into<String>) -> Self {
        SyntacticConstraint {
            name: name.into(),
            grammar: None,
            balance_brackets: true,
            forbidden_texts: Vec::new(),
            weight: 1.0,
        }
    }

    pub fn with_grammar(mut self, grammar: impl Into<String>) -> Self {
        self.grammar = Some(grammar.into());
        self
    }

    pub fn with_bracket_balancing(mut self, enabled: bool) -> Self {
        self.balance_brackets = enabled;
        self
    }

    pub fn forbid_text(mut self, text: impl Into<String>) -> Self {
        self.forbidden_texts.push(text.into());
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = clamp_weight(weight);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Constraint for SyntacticConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Syntactic
    }

    fn level(&self) -> ConstraintLevel {
        ConstraintLevel::Syntactic
    }

    fn weight(&self) -> f32 {
        self.weight
    }

    fn evaluate(&self, state: &GenerationState, vocab: &dyn Vocabulary) -> TokenMask {
        if self.weight <= 0.0 {
            return TokenMask::permissive();
        }
        let scanner = if self.balance_brackets {
            let scanner = BracketScanner::after(state.prefix());
            if scanner.is_none() {
                trace!(constraint = %self.name, "prefix already unbalanced");
            }
            scanner
        } else {
            None
        };

        let forbidden: FxHashSet<TokenId> = vocab::tokens(vocab)
            .filter(|(_, text)| {
                self.forbidden_texts.iter().any(|f| f == text)
                    || scanner.as_ref().is_some_and(|s| !s.accepts(text))
            })
            .map(|(token, _)| token)
            .collect();
        if forbidden.is_empty() {
            TokenMask::permissive()
        } else {
            TokenMask::forbid(forbidden)
        }
    }

    fn to_grammar(&self) -> Option<String> {
        self.grammar.clone()
    }

    fn cache_key(&self) -> u64 {
        content_hash(
            &self.kind(),
            self.level(),
            &(
                &self.name,
                &self.grammar,
                self.balance_brackets,
                &self.forbidden_texts,
                self.weight.to_bits(),
            ),
        )
    }
}

/// Open-bracket stack and string state at the end of a prefix.
#[derive(Clone, Debug)]
struct BracketScanner {
    stack: Vec<char>,
    quote: Option<char>,
    escaped: bool,
}

impl BracketScanner {
    /// Scanner positioned after `prefix`; `None` when the prefix itself
    /// closes a bracket it never opened.
    fn after(prefix: &str) -> Option<Self> {
        let mut scanner = BracketScanner {
            stack: Vec::new(),
            quote: None,
            escaped: false,
        };
        scanner.feed(prefix).then_some(scanner)
    }

    /// Whether `text` can follow without breaking bracket nesting.
    fn accepts(&self, text: &str) -> bool {
        self.clone().feed(text)
    }

    fn feed(&mut self, text: &str) -> bool {
        for c in text.chars() {
            if let Some(q) = self.quote {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == q {
                    self.quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' | '`' => self.quote = Some(c),
                '(' | '[' | '{' => self.stack.push(c),
                ')' | ']' | '}' => {
                    let open = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    if self.stack.pop() != Some(open) {
                        return false;
                    }
                }
                _ => {}
            }
        }
        true
    }
}
