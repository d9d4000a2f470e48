//! 埋め込みキャッシュのテスト
//!
//! キャッシュファイルの保存・読み込み・破損時の動作を検証

use trm_rank::backends::cache::cache_key;
use trm_rank::backends::EmbeddingCache;
use tempfile::tempdir;

const MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// 空のキャッシュファイル
#[test]
fn test_cache_file_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let cache = EmbeddingCache::load(dir.path());

    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());
}

/// キャッシュの保存と読み込み
#[test]
fn test_cache_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = EmbeddingCache::load(dir.path());
    cache.insert(MODEL, "Adobe Acrobat", vec![0.1, 0.2, 0.3]);
    cache.insert(MODEL, "", vec![0.0, 0.0, 1.0]);
    cache.save(dir.path()).expect("キャッシュ保存失敗");

    let loaded = EmbeddingCache::load(dir.path());
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.get(MODEL, "Adobe Acrobat"), Some(&vec![0.1, 0.2, 0.3]));
    assert_eq!(loaded.get(MODEL, ""), Some(&vec![0.0, 0.0, 1.0]));
    // モデルが違えば別エントリ
    assert!(loaded.get("other-model", "Adobe Acrobat").is_none());
}

/// 保存先ディレクトリがなければ作成
#[test]
fn test_cache_save_creates_dir() {
    let dir = tempdir().expect("Failed to create temp dir");
    let nested = dir.path().join("cache").join("trm-rank");

    let mut cache = EmbeddingCache::default();
    cache.insert(MODEL, "Reader", vec![1.0]);
    cache.save(&nested).expect("キャッシュ保存失敗");

    assert!(EmbeddingCache::cache_path(&nested).exists());
}

/// 破損したキャッシュファイル
#[test]
fn test_cache_corrupted_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(EmbeddingCache::cache_path(dir.path()), "{ invalid json }").unwrap();

    let cache = EmbeddingCache::load(dir.path());
    assert!(cache.is_empty());
}

/// バージョン不一致のキャッシュは捨てる
#[test]
fn test_cache_version_mismatch() {
    let dir = tempdir().expect("Failed to create temp dir");
    let key = cache_key(MODEL, "Reader");
    let json = format!(
        r#"{{"version": 99, "entries": {{"{}": {{"model": "{}", "text": "Reader", "vector": [1.0]}}}}}}"#,
        key, MODEL
    );
    std::fs::write(EmbeddingCache::cache_path(dir.path()), json).unwrap();

    assert!(EmbeddingCache::load(dir.path()).is_empty());
}

/// キャッシュの削除
#[test]
fn test_cache_clear() {
    let dir = tempdir().expect("Failed to create temp dir");

    assert!(!EmbeddingCache::clear(dir.path()).unwrap());

    let mut cache = EmbeddingCache::default();
    cache.insert(MODEL, "Reader", vec![1.0]);
    cache.save(dir.path()).unwrap();

    assert!(EmbeddingCache::clear(dir.path()).unwrap());
    assert!(!EmbeddingCache::cache_path(dir.path()).exists());
}
