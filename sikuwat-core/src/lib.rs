pub mod config;
pub mod drafts;
pub mod error;
pub mod knowledge;
pub mod prompt;
pub mod stats;
pub mod validation;

pub use config::{load_dotenv, SikuwatConfig};
pub use drafts::{
    parse_date, ArticleDraft, HarvestDraft, MarketPriceDraft, PlantingDraft, Role, TipDraft,
};
pub use error::{Result, SikuwatError};
pub use knowledge::{append_references, Detail, KnowledgeBase, Topic};
pub use prompt::{build_prompt, extract_keywords, ChatContext, ContextArticle, ContextTip};
pub use stats::{HarvestFigures, PlantingStats};
pub use validation::{sanitize_text, Validation};
