use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use slipway_types::{FileMode, Identity, Oid, Timestamp};

use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Raw content (file contents, symlink targets).
    Blob,
    /// Directory listing: ordered entries mapping names to object references.
    Tree,
    /// Snapshot of a tree with ancestry and authorship metadata.
    Commit,
}

impl ObjectKind {
    /// Header tag used when framing an object for hashing.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }

    /// Parse a header tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "blob" => Some(Self::Blob),
            "tree" => Some(Self::Tree),
            "commit" => Some(Self::Commit),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A stored object: kind tag + payload bytes + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// payload -- it is a pure key-value store keyed by content hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The encoded bytes of the object.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and payload.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    ///
    /// The hash covers the framed form `"<kind> <len>\0"` followed by the
    /// payload, so equal payloads stored under different kinds still get
    /// distinct IDs. This is the git loose object identity.
    pub fn compute_id(&self) -> Oid {
        let mut hasher = Sha1::new();
        hasher.update(self.kind.tag().as_bytes());
        hasher.update(b" ");
        hasher.update(self.data.len().to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(&self.data);
        Oid::from_raw(hasher.finalize().into())
    }
}

fn corrupt(obj: &StoredObject, reason: impl Into<String>) -> StoreError {
    StoreError::CorruptObject {
        id: obj.compute_id(),
        reason: reason.into(),
    }
}

fn kind_mismatch(obj: &StoredObject, expected: ObjectKind) -> StoreError {
    StoreError::TypeMismatch {
        id: obj.compute_id(),
        expected,
        actual: obj.kind,
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Content-addressed ID of this blob.
    pub fn id(&self) -> Oid {
        self.to_stored_object().compute_id()
    }

    /// Convert into a `StoredObject` for storage. The payload is the raw
    /// content, unframed.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Blob {
            return Err(kind_mismatch(obj, ObjectKind::Blob));
        }
        Ok(Self {
            data: obj.data.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// File mode (regular, executable, symlink, directory, submodule).
    pub mode: FileMode,
    /// Entry name, unique within its tree.
    pub name: String,
    /// Content-addressed ID of the referenced object.
    pub oid: Oid,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(mode: FileMode, name: impl Into<String>, oid: Oid) -> Self {
        Self {
            mode,
            name: name.into(),
            oid,
        }
    }

    /// Canonical sort key: name bytes, with directories compared as if
    /// their name carried a trailing '/'. This matches git's tree order.
    fn sort_key(&self) -> Vec<u8> {
        let mut key = self.name.clone().into_bytes();
        if self.mode.is_directory() {
            key.push(b'/');
        }
        key
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Directory listing object.
///
/// Entries are held in canonical order at all times; constructors and
/// mutators maintain it. A tree's ID is a pure function of its entries'
/// (mode, name, oid) triples in that order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a new tree with the given entries.
    ///
    /// Entries are sorted into canonical order for deterministic hashing.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort();
        Self { entries }
    }

    /// Create an empty tree.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Content-addressed ID of this tree.
    pub fn id(&self) -> Oid {
        self.to_stored_object().compute_id()
    }

    /// The entries in canonical order.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Insert an entry, or replace the entry carrying the same name.
    ///
    /// Canonical order is preserved; a mode change that moves the entry
    /// relative to its neighbours is handled.
    pub fn set_entry(&mut self, entry: TreeEntry) {
        self.entries.retain(|e| e.name != entry.name);
        let key = entry.sort_key();
        let pos = self.entries.partition_point(|e| e.sort_key() < key);
        self.entries.insert(pos, entry);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into a `StoredObject` for storage.
    ///
    /// The payload is the git tree wire format: for each entry, the octal
    /// mode, a space, the name, a NUL byte, then the raw 20-byte hash.
    pub fn to_stored_object(&self) -> StoredObject {
        let mut data = Vec::new();
        for entry in &self.entries {
            data.extend_from_slice(entry.mode.to_wire().as_bytes());
            data.push(b' ');
            data.extend_from_slice(entry.name.as_bytes());
            data.push(0);
            data.extend_from_slice(entry.oid.as_bytes());
        }
        StoredObject::new(ObjectKind::Tree, data)
    }

    /// Decode from a `StoredObject`.
    ///
    /// Entry order is preserved as read so that re-encoding reproduces the
    /// original bytes; [`Tree::validate`] checks canonical order.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Tree {
            return Err(kind_mismatch(obj, ObjectKind::Tree));
        }
        let mut entries = Vec::new();
        let mut rest = &obj.data[..];
        while !rest.is_empty() {
            let space = rest
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| corrupt(obj, "missing space after entry mode"))?;
            let mode_text = std::str::from_utf8(&rest[..space])
                .map_err(|_| corrupt(obj, "entry mode is not valid UTF-8"))?;
            let bits = u32::from_str_radix(mode_text, 8)
                .map_err(|_| corrupt(obj, format!("bad octal mode {mode_text:?}")))?;
            let mode = FileMode::from_mode_bits(bits)
                .ok_or_else(|| corrupt(obj, format!("unknown file mode {mode_text}")))?;
            rest = &rest[space + 1..];

            let nul = rest
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| corrupt(obj, "missing NUL after entry name"))?;
            let name = std::str::from_utf8(&rest[..nul])
                .map_err(|_| corrupt(obj, "entry name is not valid UTF-8"))?
                .to_string();
            rest = &rest[nul + 1..];

            if rest.len() < 20 {
                return Err(corrupt(obj, "truncated entry hash"));
            }
            let mut raw = [0u8; 20];
            raw.copy_from_slice(&rest[..20]);
            rest = &rest[20..];

            entries.push(TreeEntry::new(mode, name, Oid::from_raw(raw)));
        }
        Ok(Self { entries })
    }

    /// Check tree well-formedness: non-empty, slash- and NUL-free, unique
    /// entry names referencing non-null IDs, in canonical order.
    pub fn validate(&self) -> StoreResult<()> {
        let id = self.id();
        let invalid = |reason: String| StoreError::InvalidObject { id, reason };

        let mut seen = std::collections::HashSet::new();
        for entry in &self.entries {
            if entry.name.is_empty() {
                return Err(invalid("empty entry name".to_string()));
            }
            if entry.name == "." || entry.name == ".." {
                return Err(invalid(format!("reserved entry name {:?}", entry.name)));
            }
            if entry.name.contains('/') || entry.name.contains('\0') {
                return Err(invalid(format!(
                    "entry name {:?} contains forbidden bytes",
                    entry.name
                )));
            }
            if entry.oid.is_null() {
                return Err(invalid(format!(
                    "entry {:?} references the null id",
                    entry.name
                )));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(invalid(format!("duplicate entry name {:?}", entry.name)));
            }
        }
        for pair in self.entries.windows(2) {
            if pair[0].sort_key() >= pair[1].sort_key() {
                return Err(invalid(format!(
                    "entries {:?} and {:?} out of canonical order",
                    pair[0].name, pair[1].name
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Snapshot of a tree with ancestry and authorship metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Root tree this commit captures.
    pub tree: Oid,
    /// Parent commits, in order.
    pub parents: Vec<Oid>,
    /// Who wrote the change.
    pub author: Identity,
    /// When the change was written.
    pub author_time: Timestamp,
    /// Who created the commit.
    pub committer: Identity,
    /// When the commit was created.
    pub commit_time: Timestamp,
    /// Message encoding declared in the header, if any.
    pub encoding: Option<String>,
    /// Commit message.
    pub message: String,
}

impl Commit {
    /// Content-addressed ID of this commit.
    pub fn id(&self) -> Oid {
        self.to_stored_object().compute_id()
    }

    /// Convert into a `StoredObject` for storage.
    ///
    /// The payload is the git commit format: `tree` and `parent` header
    /// lines, `author` and `committer` person lines, an optional
    /// `encoding` line, a blank line, then the message.
    pub fn to_stored_object(&self) -> StoredObject {
        let mut text = String::new();
        text.push_str(&format!("tree {}\n", self.tree.to_hex()));
        for parent in &self.parents {
            text.push_str(&format!("parent {}\n", parent.to_hex()));
        }
        text.push_str(&format!("author {} {}\n", self.author, self.author_time));
        text.push_str(&format!(
            "committer {} {}\n",
            self.committer, self.commit_time
        ));
        if let Some(encoding) = &self.encoding {
            text.push_str(&format!("encoding {encoding}\n"));
        }
        text.push('\n');
        text.push_str(&self.message);
        StoredObject::new(ObjectKind::Commit, text.into_bytes())
    }

    /// Decode from a `StoredObject`.
    ///
    /// Headers this core does not interpret (`gpgsig`, `mergetag`, ...)
    /// are skipped, together with their continuation lines.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Commit {
            return Err(kind_mismatch(obj, ObjectKind::Commit));
        }
        let text = std::str::from_utf8(&obj.data)
            .map_err(|_| corrupt(obj, "commit is not valid UTF-8"))?;
        let (header, message) = text
            .split_once("\n\n")
            .ok_or_else(|| corrupt(obj, "missing blank line after headers"))?;

        let mut tree = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;
        let mut encoding = None;

        for line in header.lines() {
            // Continuation of a multi-line header we do not interpret.
            if line.starts_with(' ') {
                continue;
            }
            let (field, value) = line
                .split_once(' ')
                .ok_or_else(|| corrupt(obj, format!("malformed header line: {line:?}")))?;
            match field {
                "tree" => tree = Some(parse_header_oid(obj, value)?),
                "parent" => parents.push(parse_header_oid(obj, value)?),
                "author" => author = Some(parse_person(obj, value)?),
                "committer" => committer = Some(parse_person(obj, value)?),
                "encoding" => encoding = Some(value.to_string()),
                _ => {}
            }
        }

        let tree = tree.ok_or_else(|| corrupt(obj, "missing tree header"))?;
        let (author, author_time) = author.ok_or_else(|| corrupt(obj, "missing author header"))?;
        let (committer, commit_time) =
            committer.ok_or_else(|| corrupt(obj, "missing committer header"))?;

        Ok(Self {
            tree,
            parents,
            author,
            author_time,
            committer,
            commit_time,
            encoding,
            message: message.to_string(),
        })
    }

    /// Check commit well-formedness. A prepared commit references exactly
    /// one non-null parent, a non-null tree, and identities free of bytes
    /// that would corrupt the header encoding.
    pub fn validate(&self) -> StoreResult<()> {
        let id = self.id();
        let invalid = |reason: String| StoreError::InvalidObject { id, reason };

        if self.tree.is_null() {
            return Err(invalid("null tree reference".to_string()));
        }
        if self.parents.len() != 1 {
            return Err(invalid(format!(
                "expected exactly one parent, got {}",
                self.parents.len()
            )));
        }
        if self.parents[0].is_null() {
            return Err(invalid("null parent reference".to_string()));
        }
        if !self.author.is_well_formed() {
            return Err(invalid(format!(
                "author {:?} contains forbidden bytes",
                self.author.name
            )));
        }
        if !self.committer.is_well_formed() {
            return Err(invalid(format!(
                "committer {:?} contains forbidden bytes",
                self.committer.name
            )));
        }
        Ok(())
    }
}

fn parse_header_oid(obj: &StoredObject, value: &str) -> StoreResult<Oid> {
    Oid::from_hex(value).map_err(|e| corrupt(obj, format!("bad object id in header: {e}")))
}

fn parse_person(obj: &StoredObject, value: &str) -> StoreResult<(Identity, Timestamp)> {
    let open = value
        .find('<')
        .ok_or_else(|| corrupt(obj, "person header missing '<'"))?;
    let close = value[open..]
        .find('>')
        .map(|i| open + i)
        .ok_or_else(|| corrupt(obj, "person header missing '>'"))?;
    let name = value[..open].trim_end().to_string();
    let email = value[open + 1..close].to_string();

    let rest = value[close + 1..].trim_start();
    let (seconds_text, offset_text) = rest
        .split_once(' ')
        .ok_or_else(|| corrupt(obj, "person header missing timestamp"))?;
    let seconds: i64 = seconds_text
        .parse()
        .map_err(|_| corrupt(obj, format!("bad timestamp {seconds_text:?} in person header")))?;
    let offset = Timestamp::parse_offset(offset_text)
        .ok_or_else(|| corrupt(obj, format!("bad timezone {offset_text:?} in person header")))?;

    Ok((Identity::new(name, email), Timestamp::new(seconds, offset)))
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// Any decoded object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    /// The kind of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
        }
    }

    /// Content-addressed ID of this object.
    pub fn id(&self) -> Oid {
        self.to_stored_object().compute_id()
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        match self {
            Self::Blob(blob) => blob.to_stored_object(),
            Self::Tree(tree) => tree.to_stored_object(),
            Self::Commit(commit) => commit.to_stored_object(),
        }
    }

    /// Decode from a `StoredObject`, dispatching on its kind.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        match obj.kind {
            ObjectKind::Blob => Ok(Self::Blob(Blob::from_stored_object(obj)?)),
            ObjectKind::Tree => Ok(Self::Tree(Tree::from_stored_object(obj)?)),
            ObjectKind::Commit => Ok(Self::Commit(Commit::from_stored_object(obj)?)),
        }
    }

    /// Check well-formedness of the contained object.
    pub fn validate(&self) -> StoreResult<()> {
        match self {
            Self::Blob(_) => Ok(()),
            Self::Tree(tree) => tree.validate(),
            Self::Commit(commit) => commit.validate(),
        }
    }
}

impl From<Blob> for Object {
    fn from(blob: Blob) -> Self {
        Self::Blob(blob)
    }
}

impl From<Tree> for Object {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

impl From<Commit> for Object {
    fn from(commit: Commit) -> Self {
        Self::Commit(commit)
    }
}
