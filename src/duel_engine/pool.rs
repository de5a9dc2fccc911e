use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::duel_engine::models::{Question, OPTION_COUNT};
use crate::error::SupplyError;

/// Source of question batches for a duel.
pub trait QuestionSupplier {
    /// Return exactly `count` questions, or `InsufficientPool`.
    fn draw_questions(&mut self, count: usize) -> Result<Vec<Question>, SupplyError>;
}

/// Check the structural rules every duel question must satisfy.
pub fn validate_question(q: &Question) -> Result<(), SupplyError> {
    let malformed = |reason: String| SupplyError::Malformed {
        question_id: q.id.clone(),
        reason,
    };

    if q.options.len() != OPTION_COUNT {
        return Err(malformed(format!(
            "expected {OPTION_COUNT} options, found {}",
            q.options.len()
        )));
    }
    for (i, a) in q.options.iter().enumerate() {
        if q.options[i + 1..].contains(a) {
            return Err(malformed(format!("duplicate option '{a}'")));
        }
    }
    if q.correct_index >= q.options.len() {
        return Err(malformed(format!("correct index {} out of range", q.correct_index)));
    }
    if q.time_limit_secs == 0 {
        return Err(malformed("time limit must be positive".into()));
    }
    Ok(())
}

/// An in-memory pool that deals a freshly shuffled batch on every draw.
pub struct QuestionPool {
    questions: Vec<Question>,
    rng: ChaCha8Rng,
}

impl QuestionPool {
    /// Build a pool; `seed` makes every draw reproducible.
    pub fn new(questions: Vec<Question>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None       => ChaCha8Rng::from_entropy(),
        };
        QuestionPool { questions, rng }
    }

    /// Parse a JSON array of questions.
    pub fn from_json_str(json: &str, seed: Option<u64>) -> Result<Self, serde_json::Error> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Ok(Self::new(questions, seed))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl QuestionSupplier for QuestionPool {
    fn draw_questions(&mut self, count: usize) -> Result<Vec<Question>, SupplyError> {
        if count > self.questions.len() {
            return Err(SupplyError::InsufficientPool {
                requested: count,
                available: self.questions.len(),
            });
        }

        // Fisher-Yates over indices keeps the pool itself in load order.
        let mut order: Vec<usize> = (0..self.questions.len()).collect();
        for i in (1..order.len()).rev() {
            let j = self.rng.gen_range(0..=i);
            order.swap(i, j);
        }

        let batch: Vec<Question> = order[..count]
            .iter()
            .map(|&i| self.questions[i].clone())
            .collect();
        for q in &batch {
            validate_question(q)?;
        }
        Ok(batch)
    }
}

/// A small general-knowledge set, handy for demos and smoke tests.
pub fn sample_questions() -> Vec<Question> {
    let q = |id: &str, prompt: &str, options: [&str; 4], correct: usize, category: &str| Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        options: options.iter().map(|s| s.to_string()).collect(),
        correct_index: correct,
        time_limit_secs: 15,
        points: 100,
        category: category.to_string(),
    };
    vec![
        q("geo-1", "What is the capital of Australia?", ["Sydney", "Canberra", "Melbourne", "Perth"], 1, "geography"),
        q("geo-2", "Which river flows through Cairo?", ["Nile", "Tigris", "Congo", "Niger"], 0, "geography"),
        q("geo-3", "Mount Kilimanjaro is in which country?", ["Kenya", "Uganda", "Tanzania", "Ethiopia"], 2, "geography"),
        q("sci-1", "What is the chemical symbol for sodium?", ["So", "Sd", "S", "Na"], 3, "science"),
        q("sci-2", "How many bones are in the adult human body?", ["206", "186", "212", "198"], 0, "science"),
        q("sci-3", "Which planet has the shortest year?", ["Venus", "Mercury", "Mars", "Earth"], 1, "science"),
        q("his-1", "In which year did the Berlin Wall fall?", ["1987", "1991", "1989", "1985"], 2, "history"),
        q("his-2", "Who was the first Roman emperor?", ["Nero", "Caesar", "Trajan", "Augustus"], 3, "history"),
        q("mat-1", "What is 7 x 8?", ["54", "56", "58", "64"], 1, "math"),
        q("mat-2", "What is the square root of 144?", ["12", "14", "11", "13"], 0, "math"),
        q("mat-3", "How many sides does a heptagon have?", ["6", "8", "7", "9"], 2, "math"),
        q("lit-1", "Who wrote 'Pride and Prejudice'?", ["Charlotte Bronte", "Jane Austen", "Mary Shelley", "George Eliot"], 1, "literature"),
    ]
}
