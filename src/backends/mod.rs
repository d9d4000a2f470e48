//! モデル・辞書のバックエンド
//!
//! - http_encoder: OpenAI互換の埋め込みAPI
//! - cache: 埋め込みのディスクキャッシュ
//! - word_vectors: 単語ベクトルによる文書ベクトル
//! - wordnet: WordNet辞書ファイルの読み込み

pub mod cache;
pub mod http_encoder;
pub mod word_vectors;
pub mod wordnet;

pub use cache::{CachedEncoder, EmbeddingCache};
pub use http_encoder::HttpEncoder;
pub use word_vectors::WordVectors;
pub use wordnet::load_wordnet;
