//! Tests for the hash function and Directory bitmap
//!
//! These tests verify:
//! - Hash values are the documented polynomial and byte-order independent
//! - Directory bits start clear and persist once set
//! - The directory grows in whole 4096-byte blocks
//! - The addressable bit count tracks the file size

use std::fs::{File, OpenOptions};
use std::path::Path;

use hashdbm::directory::{Directory, BITS_PER_BLOCK, DIR_BLOCK_SIZE};
use hashdbm::hash::{hash, mask};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn open_dir_file(path: &Path) -> File {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .unwrap()
}

// =============================================================================
// Hash Tests
// =============================================================================

#[test]
fn test_hash_known_values() {
    assert_eq!(hash(b""), 0);
    assert_eq!(hash(b"a"), 97);
    assert_eq!(hash(b"ab"), 98 + 65599 * 97);
}

#[test]
fn test_hash_wraps() {
    let long = vec![0xffu8; 64];
    let expected = long
        .iter()
        .fold(0u32, |acc, &b| u32::from(b).wrapping_add(acc.wrapping_mul(65599)));

    assert_eq!(hash(&long), expected);
}

#[test]
fn test_hash_depends_on_order() {
    assert_ne!(hash(b"ab"), hash(b"ba"));
}

#[test]
fn test_mask_for_depth() {
    assert_eq!(mask(0), 0);
    assert_eq!(mask(1), 1);
    assert_eq!(mask(3), 0b111);
    assert_eq!(mask(31), 0x7fff_ffff);
    assert_eq!(mask(32), u32::MAX);
    assert_eq!(mask(40), u32::MAX);
}

// =============================================================================
// Directory Tests
// =============================================================================

#[test]
fn test_empty_directory() {
    let temp = TempDir::new().unwrap();
    let mut dir = Directory::new(open_dir_file(&temp.path().join("t.dir"))).unwrap();

    assert_eq!(dir.max_bits(), 0);
    assert!(!dir.get_bit(0).unwrap());
    assert!(!dir.get_bit(100_000).unwrap());
    assert_eq!(dir.count_set_bits().unwrap(), 0);
}

#[test]
fn test_set_bit_writes_through() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("t.dir");
    let mut dir = Directory::new(open_dir_file(&path)).unwrap();

    dir.set_bit(0).unwrap();
    dir.set_bit(5).unwrap();

    assert!(dir.get_bit(0).unwrap());
    assert!(dir.get_bit(5).unwrap());
    assert!(!dir.get_bit(1).unwrap());
    assert_eq!(dir.max_bits(), BITS_PER_BLOCK);

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), DIR_BLOCK_SIZE);
    assert_eq!(bytes[0], 0b0010_0001);
}

#[test]
fn test_bit_in_later_block_grows_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("t.dir");
    let mut dir = Directory::new(open_dir_file(&path)).unwrap();

    dir.set_bit(0).unwrap();
    dir.set_bit(BITS_PER_BLOCK + 3).unwrap();

    assert_eq!(dir.max_bits(), 2 * BITS_PER_BLOCK);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 2 * DIR_BLOCK_SIZE as u64);

    // Switching blocks reloads the cache
    assert!(dir.get_bit(0).unwrap());
    assert!(dir.get_bit(BITS_PER_BLOCK + 3).unwrap());
    assert!(!dir.get_bit(BITS_PER_BLOCK + 2).unwrap());
    assert_eq!(dir.count_set_bits().unwrap(), 2);
}

#[test]
fn test_bits_persist_across_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("t.dir");

    {
        let mut dir = Directory::new(open_dir_file(&path)).unwrap();
        for bit in [0u64, 1, 2, 4, 9, 77] {
            dir.set_bit(bit).unwrap();
        }
    }

    let mut dir = Directory::new(open_dir_file(&path)).unwrap();

    assert_eq!(dir.max_bits(), BITS_PER_BLOCK);
    for bit in 0..100u64 {
        let expected = [0u64, 1, 2, 4, 9, 77].contains(&bit);
        assert_eq!(dir.get_bit(bit).unwrap(), expected, "bit {}", bit);
    }
    assert_eq!(dir.count_set_bits().unwrap(), 6);
}

#[test]
fn test_setting_bit_twice_is_harmless() {
    let temp = TempDir::new().unwrap();
    let mut dir = Directory::new(open_dir_file(&temp.path().join("t.dir"))).unwrap();

    dir.set_bit(12).unwrap();
    dir.set_bit(12).unwrap();

    assert!(dir.get_bit(12).unwrap());
    assert_eq!(dir.count_set_bits().unwrap(), 1);
}
