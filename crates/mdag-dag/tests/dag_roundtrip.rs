//! End-to-end build and resolve tests over the public API.

use std::sync::Arc;

use mdag_crypto::{DigestState, HashAlgorithm, HashPrimitive, ObjectHasher};
use mdag_dag::{DagBuilder, DagConfig, DagError, DagResolver, FsSource, MemNode};
use mdag_store::{FsObjectStore, InMemoryObjectStore, ObjectStore, StoreError, StoreResult};
use mdag_types::{codec, Digest, Object, ObjectKind, CHUNK_SIZE};

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

fn small() -> DagConfig {
    DagConfig {
        chunk_size: 4,
        max_fanout: 4,
        ..Default::default()
    }
}

fn fetch(store: &InMemoryObjectStore, digest: &Digest) -> Object {
    codec::decode(&store.get(digest).unwrap().unwrap()).unwrap()
}

fn sample_tree() -> MemNode {
    MemNode::dir(
        "root",
        vec![
            MemNode::dir(
                "dir",
                vec![MemNode::dir("sub", vec![MemNode::file("file.txt", "hello")])],
            ),
            MemNode::file("readme", "top level"),
        ],
    )
}

#[test]
fn nested_path_resolves_to_file_content() {
    let store = InMemoryObjectStore::new();
    let root = DagBuilder::new(&store).add(&sample_tree().as_source()).unwrap();

    let resolver = DagResolver::new(&store);
    assert_eq!(resolver.resolve(&root, "dir/sub/file.txt").unwrap(), b"hello");
    assert_eq!(resolver.resolve(&root, "/readme").unwrap(), b"top level");
}

#[test]
fn paths_are_relative_to_the_built_directory() {
    let store = InMemoryObjectStore::new();
    let dir = MemNode::dir(
        "dir",
        vec![MemNode::dir("sub", vec![MemNode::file("file.txt", "hello")])],
    );
    let root = DagBuilder::new(&store).add(&dir.as_source()).unwrap();
    assert_eq!(
        DagResolver::new(&store).resolve(&root, "sub/file.txt").unwrap(),
        b"hello"
    );
}

#[test]
fn unknown_name_is_path_not_found() {
    let store = InMemoryObjectStore::new();
    let root = DagBuilder::new(&store).add(&sample_tree().as_source()).unwrap();

    let err = DagResolver::new(&store).resolve(&root, "nope").unwrap_err();
    assert!(matches!(err, DagError::PathNotFound { ref component, .. } if component == "nope"));
}

#[test]
fn resolving_a_directory_concatenates_its_files() {
    let store = InMemoryObjectStore::new();
    let root = DagBuilder::new(&store).add(&sample_tree().as_source()).unwrap();
    let bytes = DagResolver::new(&store).resolve(&root, "").unwrap();
    assert_eq!(bytes, b"hellotop level");
}

#[test]
fn same_tree_same_root_across_stores() {
    let a = InMemoryObjectStore::new();
    let b = InMemoryObjectStore::new();
    let root_a = DagBuilder::new(&a).add(&sample_tree().as_source()).unwrap();
    let root_b = DagBuilder::new(&b).add(&sample_tree().as_source()).unwrap();
    assert_eq!(root_a, root_b);

    let mut keys_a = a.all_keys();
    let mut keys_b = b.all_keys();
    keys_a.sort();
    keys_b.sort();
    assert_eq!(keys_a, keys_b);
}

#[test]
fn rebuilding_writes_nothing_new() {
    let store = InMemoryObjectStore::new();
    let builder = DagBuilder::new(&store);
    let first = builder.add(&sample_tree().as_source()).unwrap();
    let count = store.len();
    let second = builder.add(&sample_tree().as_source()).unwrap();
    assert_eq!(first, second);
    assert_eq!(store.len(), count);
}

#[test]
fn identical_content_is_stored_once() {
    let store = InMemoryObjectStore::new();
    let builder = DagBuilder::new(&store);

    builder
        .add(&MemNode::dir("a", vec![MemNode::file("x", "same")]).as_source())
        .unwrap();
    assert_eq!(store.len(), 2);

    builder
        .add(
            &MemNode::dir(
                "b",
                vec![MemNode::file("y", "same"), MemNode::file("z", "other")],
            )
            .as_source(),
        )
        .unwrap();
    // One new blob and one new tree.
    assert_eq!(store.len(), 4);
}

#[test]
fn directory_digest_ignores_names_and_tags() {
    let store = InMemoryObjectStore::new();
    let builder = DagBuilder::new(&store);

    let dir = MemNode::dir(
        "d",
        vec![MemNode::file("one", "1"), MemNode::file("two", "22")],
    );
    let root = builder.add(&dir.as_source()).unwrap();
    let tree = fetch(&store, &root);
    assert_eq!(tree.kind(), ObjectKind::Tree);

    let mut concat = Vec::new();
    for link in &tree.links {
        concat.extend_from_slice(link.hash.as_bytes());
    }
    assert_eq!(root, HashAlgorithm::Blake3.digest(&concat));

    let renamed = MemNode::dir(
        "elsewhere",
        vec![MemNode::file("uno", "1"), MemNode::file("dos", "22")],
    );
    assert_eq!(builder.add(&renamed.as_source()).unwrap(), root);
}

#[test]
fn boundary_sizes_round_trip_with_canonical_chunks() {
    for len in [0, 1, CHUNK_SIZE - 1, CHUNK_SIZE, CHUNK_SIZE + 1] {
        let store = InMemoryObjectStore::new();
        let content = pattern(len);
        let root = DagBuilder::new(&store)
            .add(&MemNode::file("f", content.clone()).as_source())
            .unwrap();
        let object = fetch(&store, &root);

        if len <= CHUNK_SIZE {
            assert!(object.is_leaf(), "len {len} should be a single blob");
        } else {
            let sizes: Vec<u64> = object.links.iter().map(|l| l.size).collect();
            assert_eq!(sizes, [CHUNK_SIZE as u64, 1]);
        }
        assert_eq!(DagResolver::new(&store).resolve(&root, "").unwrap(), content);
    }
}

#[test]
fn full_fanout_plus_one_adds_a_level() {
    let config = small();
    let store = InMemoryObjectStore::new();
    let builder = DagBuilder::with_config(&store, config).unwrap();

    // 17 bytes = 5 chunks, one more than a single list can hold.
    let content = pattern(17);
    let (root, stats) = builder
        .add_with_stats(&MemNode::file("f", content.clone()).as_source())
        .unwrap();
    assert_eq!(stats.max_height, 2);
    assert_eq!(stats.blobs, 5);

    let top = fetch(&store, &root);
    let sizes: Vec<u64> = top.links.iter().map(|l| l.size).collect();
    assert_eq!(sizes, [16, 1]);
    assert_eq!(DagResolver::new(&store).resolve(&root, "").unwrap(), content);
}

#[test]
fn exactly_fanout_chunks_gets_height_two() {
    let store = InMemoryObjectStore::new();
    let builder = DagBuilder::with_config(&store, small()).unwrap();
    let content = pattern(16);
    let root = builder.add(&MemNode::file("f", content.clone()).as_source()).unwrap();

    let top = fetch(&store, &root);
    assert_eq!(top.links.len(), 1);
    assert_eq!(top.links[0].size, 16);
    assert_eq!(fetch(&store, &top.links[0].hash).links.len(), 4);
    assert_eq!(DagResolver::new(&store).resolve(&root, "").unwrap(), content);
}

#[test]
fn no_list_exceeds_max_fanout() {
    let store = InMemoryObjectStore::new();
    let builder = DagBuilder::with_config(&store, small()).unwrap();
    builder
        .add(&MemNode::file("big", pattern(200)).as_source())
        .unwrap();

    for key in store.all_keys() {
        let object = fetch(&store, &key);
        if object.kind() == ObjectKind::List {
            assert!(object.links.len() <= 4);
        }
    }
}

#[test]
fn removed_child_is_missing_object() {
    let store = InMemoryObjectStore::new();
    let root = DagBuilder::new(&store).add(&sample_tree().as_source()).unwrap();
    let readme = DagResolver::new(&store).locate(&root, "readme").unwrap().0;
    assert!(store.remove(&readme));

    let err = DagResolver::new(&store).resolve(&root, "readme").unwrap_err();
    assert!(matches!(err, DagError::MissingObject(d) if d == readme));
}

#[test]
fn garbage_bytes_are_decode_errors() {
    let store = InMemoryObjectStore::new();
    let root = DagBuilder::new(&store).add(&sample_tree().as_source()).unwrap();
    let readme = DagResolver::new(&store).locate(&root, "readme").unwrap().0;
    store.overwrite(&readme, b"\xff\xfe not json".to_vec());

    let err = DagResolver::new(&store).resolve(&root, "readme").unwrap_err();
    assert!(matches!(err, DagError::Decode { digest, .. } if digest == readme));
}

#[test]
fn verify_walks_whole_dag() {
    let store = InMemoryObjectStore::new();
    let builder = DagBuilder::with_config(&store, small()).unwrap();
    let (root, stats) = builder
        .add_with_stats(
            &MemNode::dir("d", vec![MemNode::file("f", pattern(40))]).as_source(),
        )
        .unwrap();
    let checked = DagResolver::with_config(&store, builder.config())
        .verify(&root)
        .unwrap();
    assert_eq!(checked, store.len());
    assert!(checked as u64 <= stats.objects_written);
}

struct ReadOnlyStore;

impl ObjectStore for ReadOnlyStore {
    fn get(&self, _key: &Digest) -> StoreResult<Option<Vec<u8>>> {
        Ok(None)
    }

    fn put(&self, _key: &Digest, _value: &[u8]) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }
}

#[test]
fn failed_put_is_store_write() {
    let err = DagBuilder::new(&ReadOnlyStore)
        .add(&MemNode::file("f", "x").as_source())
        .unwrap_err();
    assert!(matches!(
        err,
        DagError::StoreWrite {
            source: StoreError::ReadOnly,
            ..
        }
    ));
}

#[test]
fn sha256_changes_digests_not_content() {
    let store = InMemoryObjectStore::new();
    let config = DagConfig {
        hash: HashAlgorithm::Sha256,
        ..Default::default()
    };
    let sha_root = DagBuilder::with_config(&store, config.clone())
        .unwrap()
        .add(&sample_tree().as_source())
        .unwrap();
    let blake_root = DagBuilder::new(&store).add(&sample_tree().as_source()).unwrap();
    assert_ne!(sha_root, blake_root);
    assert_eq!(sha_root.len(), 32);

    let resolver = DagResolver::with_config(&store, &config);
    assert_eq!(resolver.resolve(&sha_root, "dir/sub/file.txt").unwrap(), b"hello");
    assert_eq!(resolver.verify(&sha_root).unwrap(), 5);
}

/// 64-bit FNV-1a, enough to exercise an injected primitive.
struct Fnv;

struct FnvState(u64);

impl DigestState for FnvState {
    fn update(&mut self, data: &[u8]) {
        for byte in data {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(0x0100_0000_01b3);
        }
    }

    fn finalize(self: Box<Self>) -> Digest {
        Digest::from(self.0.to_be_bytes())
    }
}

impl HashPrimitive for Fnv {
    fn name(&self) -> &'static str {
        "fnv1a64"
    }

    fn begin(&self) -> Box<dyn DigestState> {
        Box::new(FnvState(0xcbf2_9ce4_8422_2325))
    }
}

#[test]
fn injected_primitive_drives_every_digest() {
    let store = InMemoryObjectStore::new();
    let hasher = ObjectHasher::new(Arc::new(Fnv));
    let root = DagBuilder::new(&store)
        .with_hasher(hasher.clone())
        .add(&sample_tree().as_source())
        .unwrap();
    assert_eq!(root.len(), 8);
    assert!(store.all_keys().iter().all(|k| k.len() == 8));

    let resolver = DagResolver::new(&store).with_hasher(hasher);
    assert_eq!(resolver.resolve(&root, "dir/sub/file.txt").unwrap(), b"hello");
    assert_eq!(resolver.verify(&root).unwrap(), store.len());
}

#[test]
fn filesystem_tree_round_trips_through_fs_store() {
    let src = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(src.path().join("docs/deep")).unwrap();
    std::fs::write(src.path().join("docs/deep/note.txt"), "deep note").unwrap();
    std::fs::write(src.path().join("big.bin"), pattern(50)).unwrap();
    std::fs::write(src.path().join("empty"), "").unwrap();

    let objects = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(objects.path()).unwrap();
    let builder = DagBuilder::with_config(&store, small()).unwrap();
    let root = builder.add(&FsSource::open(src.path()).unwrap()).unwrap();

    let resolver = DagResolver::new(&store);
    assert_eq!(resolver.resolve(&root, "docs/deep/note.txt").unwrap(), b"deep note");
    assert_eq!(resolver.resolve(&root, "big.bin").unwrap(), pattern(50));
    assert!(resolver.resolve(&root, "empty").unwrap().is_empty());

    let names: Vec<String> = resolver
        .list(&root, "")
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(names, ["big.bin", "docs", "empty"]);

    // A second build from disk lands on the same root.
    let again = builder.add(&FsSource::open(src.path()).unwrap()).unwrap();
    assert_eq!(again, root);
}

#[test]
fn write_to_streams_and_counts() {
    let store = InMemoryObjectStore::new();
    let content = pattern(33);
    let root = DagBuilder::with_config(&store, small())
        .unwrap()
        .add(&MemNode::file("f", content.clone()).as_source())
        .unwrap();

    let mut sink = Vec::new();
    let written = DagResolver::new(&store).write_to(&root, "", &mut sink).unwrap();
    assert_eq!(written, 33);
    assert_eq!(sink, content);
}

/// Single-byte additive checksum; digests collide freely.
struct OneByte;

struct OneByteState(u8);

impl DigestState for OneByteState {
    fn update(&mut self, data: &[u8]) {
        for byte in data {
            self.0 = self.0.wrapping_add(*byte);
        }
    }

    fn finalize(self: Box<Self>) -> Digest {
        Digest::from([self.0])
    }
}

impl HashPrimitive for OneByte {
    fn name(&self) -> &'static str {
        "sum8"
    }

    fn begin(&self) -> Box<dyn DigestState> {
        Box::new(OneByteState(0))
    }
}

#[test]
fn one_byte_digests_work_with_fs_store() {
    let objects = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(objects.path()).unwrap();
    let hasher = ObjectHasher::new(Arc::new(OneByte));

    let root = DagBuilder::new(&store)
        .with_hasher(hasher.clone())
        .add(&MemNode::file("f", "hello").as_source())
        .unwrap();
    assert_eq!(root.len(), 1);

    let resolver = DagResolver::new(&store).with_hasher(hasher);
    assert_eq!(resolver.resolve(&root, "").unwrap(), b"hello");
    assert_eq!(resolver.verify(&root).unwrap(), 1);
}

#[test]
fn empty_root_in_fs_store_is_missing_object() {
    let objects = tempfile::tempdir().unwrap();
    let store = FsObjectStore::open(objects.path()).unwrap();
    let err = DagResolver::new(&store)
        .resolve(&Digest::empty(), "")
        .unwrap_err();
    assert!(matches!(err, DagError::MissingObject(d) if d.is_empty()));
}
