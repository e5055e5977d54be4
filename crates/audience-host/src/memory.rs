//! ManifestHost: an in-process host that executes a [`HostManifest`].
//!
//! Every packet dispatched and every plain-text line received is appended
//! to a journal, and symbol lookups and constructions are counted, so
//! callers can assert exactly what reached the host.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use audience_core::{AudienceError, EnumConstant, HostObject, HostValue, Recipient};
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::HostError;
use crate::manifest::{HostManifest, MethodBehavior, MethodDef, RecipientKind, TypeDef};
use crate::runtime::HostRuntime;
use crate::symbol::{ConstructorSymbol, FieldSymbol, MethodSymbol, TypeRef, join};

/// Attribute holding a player's internal entity.
const HANDLE_ATTRIBUTE: &str = "handle";
/// Attribute naming the recipient that owns a connection.
const OWNER_ATTRIBUTE: &str = "owner";
/// Attribute holding how many packets a connection accepts before closing.
const CLOSES_AFTER_ATTRIBUTE: &str = "closes_after";

// ─── Journal ────────────────────────────────────────────────────────

/// Something the host observed being delivered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEntry {
    Packet { recipient: String, packet: HostValue },
    PlainText { recipient: String, text: String },
}

type Journal = Arc<Mutex<Vec<JournalEntry>>>;

// ─── Recipients ─────────────────────────────────────────────────────

/// A recipient living in a [`ManifestHost`].
#[derive(Debug)]
pub struct HostRecipient {
    name: String,
    handle: Option<HostValue>,
    journal: Journal,
}

impl Recipient for HostRecipient {
    fn name(&self) -> &str {
        &self.name
    }

    fn host_handle(&self) -> Option<&HostValue> {
        self.handle.as_ref()
    }

    fn send_plain_text(&self, text: &str) -> Result<(), AudienceError> {
        self.journal.lock().push(JournalEntry::PlainText {
            recipient: self.name.clone(),
            text: text.to_owned(),
        });
        Ok(())
    }
}

// ─── Host ───────────────────────────────────────────────────────────

pub struct ManifestHost {
    manifest: HostManifest,
    types: HashMap<TypeRef, TypeDef>,
    next_id: AtomicU64,
    journal: Journal,
    lookups: AtomicUsize,
    identity_checks: AtomicUsize,
    constructions: Mutex<HashMap<TypeRef, usize>>,
}

impl ManifestHost {
    pub fn new(manifest: HostManifest) -> Self {
        let types = manifest
            .types
            .iter()
            .map(|def| (def.name.clone(), def.clone()))
            .collect();
        Self {
            manifest,
            types,
            next_id: AtomicU64::new(1),
            journal: Arc::new(Mutex::new(Vec::new())),
            lookups: AtomicUsize::new(0),
            identity_checks: AtomicUsize::new(0),
            constructions: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, HostError> {
        Ok(Self::new(HostManifest::from_toml_str(raw)?))
    }

    pub fn load(path: &Path) -> Result<Self, HostError> {
        Ok(Self::new(HostManifest::load(path)?))
    }

    /// Spawn the recipients the manifest declares, in declaration order.
    pub fn recipients(&self) -> Vec<Arc<dyn Recipient>> {
        self.manifest
            .recipients
            .iter()
            .map(|def| {
                let recipient = match def.kind {
                    RecipientKind::Player => self.spawn_connected(&def.name, def.send_limit()),
                    RecipientKind::Console => self.console(&def.name),
                };
                Arc::new(recipient) as Arc<dyn Recipient>
            })
            .collect()
    }

    /// Spawn a live connected recipient using the manifest's player layout.
    ///
    /// Without a layout the recipient has no host handle and can only
    /// receive plain text.
    pub fn spawn_player(&self, name: &str, broken: bool) -> HostRecipient {
        self.spawn_connected(name, broken.then_some(0))
    }

    /// Like [`spawn_player`](Self::spawn_player), but the connection closes
    /// after `sends` packets.
    pub fn spawn_player_closing_after(&self, name: &str, sends: u32) -> HostRecipient {
        self.spawn_connected(name, Some(sends))
    }

    fn spawn_connected(&self, name: &str, send_limit: Option<u32>) -> HostRecipient {
        let handle = self.manifest.player.as_ref().map(|layout| {
            let mut connection =
                HostObject::new(self.allocate_id(), layout.connection_type.as_str())
                    .with_attribute(OWNER_ATTRIBUTE, HostValue::from(name));
            if let Some(limit) = send_limit {
                let limit = i32::try_from(limit).unwrap_or(i32::MAX);
                connection = connection.with_attribute(CLOSES_AFTER_ATTRIBUTE, HostValue::Int(limit));
            }
            let connection = connection.into_value();
            let entity = HostObject::new(self.allocate_id(), layout.handle_type.as_str())
                .with_attribute(layout.connection_field.as_str(), connection)
                .into_value();
            HostObject::new(self.allocate_id(), layout.player_type.as_str())
                .with_attribute(HANDLE_ATTRIBUTE, entity)
                .into_value()
        });
        HostRecipient {
            name: name.to_owned(),
            handle,
            journal: Arc::clone(&self.journal),
        }
    }

    /// A text-only recipient.
    pub fn console(&self, name: &str) -> HostRecipient {
        HostRecipient {
            name: name.to_owned(),
            handle: None,
            journal: Arc::clone(&self.journal),
        }
    }

    pub fn journal(&self) -> Vec<JournalEntry> {
        self.journal.lock().clone()
    }

    /// Packets dispatched to `recipient`, in dispatch order.
    pub fn packets_for(&self, recipient: &str) -> Vec<HostValue> {
        self.journal
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::Packet {
                    recipient: r,
                    packet,
                } if r == recipient => Some(packet.clone()),
                _ => None,
            })
            .collect()
    }

    /// Plain-text lines received by `recipient`, in order.
    pub fn plain_text_for(&self, recipient: &str) -> Vec<String> {
        self.journal
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::PlainText { recipient: r, text } if r == recipient => {
                    Some(text.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Number of metadata lookups performed (types, members, constants).
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of times the server type identity was read.
    pub fn identity_checks(&self) -> usize {
        self.identity_checks.load(Ordering::SeqCst)
    }

    /// Number of objects constructed of type `ty` through a constructor.
    pub fn constructions(&self, ty: &str) -> usize {
        self.constructions
            .lock()
            .get(&TypeRef::new(ty))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_constructions(&self) -> usize {
        self.constructions.lock().values().sum()
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn allocate(&self, ty: &TypeRef, args: Vec<HostValue>) -> HostValue {
        HostObject::new(self.allocate_id(), ty.as_str())
            .with_args(args)
            .into_value()
    }

    fn lookup(&self, ty: &TypeRef) -> Result<&TypeDef, HostError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.types
            .get(ty)
            .ok_or_else(|| HostError::MissingType(ty.to_string()))
    }

    fn method_def(&self, method: &MethodSymbol) -> Result<&MethodDef, HostError> {
        self.types
            .get(&method.owner)
            .and_then(|def| {
                def.methods
                    .iter()
                    .find(|m| m.name == method.name && m.params == method.params)
            })
            .ok_or_else(|| HostError::MissingMethod {
                owner: method.owner.to_string(),
                name: method.name.clone(),
            })
    }
}

fn receiver_object<'a>(
    method: &MethodSymbol,
    receiver: Option<&'a HostValue>,
) -> Result<&'a HostObject, HostError> {
    receiver
        .and_then(HostValue::as_object)
        .ok_or_else(|| HostError::Invocation(format!("{method} needs an object receiver")))
}

impl HostRuntime for ManifestHost {
    fn server_type(&self) -> TypeRef {
        self.identity_checks.fetch_add(1, Ordering::SeqCst);
        self.manifest.server_type.clone()
    }

    fn find_type(&self, name: &str) -> Result<TypeRef, HostError> {
        let ty = TypeRef::new(name);
        self.lookup(&ty)?;
        Ok(ty)
    }

    fn nested_types(&self, owner: &TypeRef) -> Vec<TypeRef> {
        self.lookup(owner)
            .map(|def| def.nested.clone())
            .unwrap_or_default()
    }

    fn is_assignable(&self, ty: &TypeRef, target: &str) -> bool {
        ty == target
            || self
                .types
                .get(ty)
                .is_some_and(|def| def.implements.iter().any(|i| i == target))
    }

    fn methods(&self, owner: &TypeRef) -> Vec<MethodSymbol> {
        let Ok(def) = self.lookup(owner) else {
            return Vec::new();
        };
        def.methods
            .iter()
            .map(|m| MethodSymbol {
                owner: owner.clone(),
                name: m.name.clone(),
                params: m.params.clone(),
                returns: m.returns.clone(),
                is_static: m.is_static,
            })
            .collect()
    }

    fn field(&self, owner: &TypeRef, name: &str) -> Result<FieldSymbol, HostError> {
        self.lookup(owner)?
            .fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| FieldSymbol {
                owner: owner.clone(),
                name: f.name.clone(),
                declared_type: f.declared_type.clone(),
            })
            .ok_or_else(|| HostError::MissingField {
                owner: owner.to_string(),
                name: name.to_owned(),
            })
    }

    fn constructor(
        &self,
        owner: &TypeRef,
        params: &[TypeRef],
    ) -> Result<ConstructorSymbol, HostError> {
        self.lookup(owner)?
            .constructors
            .iter()
            .find(|c| c.params == params)
            .map(|c| ConstructorSymbol {
                owner: owner.clone(),
                params: c.params.clone(),
            })
            .ok_or_else(|| HostError::MissingConstructor {
                owner: owner.to_string(),
                params: join(params),
            })
    }

    fn enum_constants(&self, ty: &TypeRef) -> Result<Vec<EnumConstant>, HostError> {
        let constants = self
            .lookup(ty)?
            .constants
            .as_ref()
            .ok_or_else(|| HostError::NotAnEnum(ty.to_string()))?;
        Ok(constants
            .iter()
            .enumerate()
            .map(|(ordinal, name)| EnumConstant {
                owner: ty.to_string(),
                name: name.clone(),
                ordinal,
            })
            .collect())
    }

    fn is_instance(&self, value: &HostValue, ty: &TypeRef) -> bool {
        value
            .as_object()
            .is_some_and(|obj| self.is_assignable(&TypeRef::new(obj.type_name.as_str()), ty.as_str()))
    }

    fn invoke(
        &self,
        method: &MethodSymbol,
        receiver: Option<&HostValue>,
        args: &[HostValue],
    ) -> Result<HostValue, HostError> {
        let def = self.method_def(method)?;
        if def.fails {
            return Err(HostError::Invocation(format!("{method} threw")));
        }
        if args.len() != method.params.len() {
            return Err(HostError::Invocation(format!(
                "{method} takes {} arguments, got {}",
                method.params.len(),
                args.len()
            )));
        }
        match def.behavior {
            MethodBehavior::Noop => Ok(HostValue::Null),
            MethodBehavior::Handle => receiver_object(method, receiver)?
                .attribute(HANDLE_ATTRIBUTE)
                .cloned()
                .ok_or_else(|| HostError::Invocation(format!("{method}: receiver has no handle"))),
            MethodBehavior::Deserialize => {
                let text = args
                    .first()
                    .and_then(HostValue::as_str)
                    .ok_or_else(|| HostError::Invocation(format!("{method} expects a string")))?;
                Ok(self.allocate(&method.returns, vec![HostValue::from(text)]))
            }
            MethodBehavior::Send => {
                let connection = receiver_object(method, receiver)?;
                let recipient = connection
                    .attribute(OWNER_ATTRIBUTE)
                    .and_then(HostValue::as_str)
                    .unwrap_or("<unknown>")
                    .to_owned();
                let mut journal = self.journal.lock();
                if let Some(&HostValue::Int(limit)) = connection.attribute(CLOSES_AFTER_ATTRIBUTE) {
                    let sent = journal
                        .iter()
                        .filter(|entry| {
                            matches!(entry, JournalEntry::Packet { recipient: r, .. } if *r == recipient)
                        })
                        .count();
                    if sent >= usize::try_from(limit).unwrap_or(0) {
                        return Err(HostError::Invocation("connection closed".to_owned()));
                    }
                }
                journal.push(JournalEntry::Packet {
                    recipient,
                    packet: args.first().cloned().unwrap_or(HostValue::Null),
                });
                Ok(HostValue::Null)
            }
        }
    }

    fn read_field(&self, field: &FieldSymbol, target: &HostValue) -> Result<HostValue, HostError> {
        let obj = target.as_object().ok_or_else(|| {
            HostError::Invocation(format!("cannot read {}#{} of a non-object", field.owner, field.name))
        })?;
        Ok(obj.attribute(&field.name).cloned().unwrap_or(HostValue::Null))
    }

    fn construct(
        &self,
        constructor: &ConstructorSymbol,
        args: Vec<HostValue>,
    ) -> Result<HostValue, HostError> {
        let def = self
            .types
            .get(&constructor.owner)
            .and_then(|def| def.constructors.iter().find(|c| c.params == constructor.params))
            .ok_or_else(|| HostError::MissingConstructor {
                owner: constructor.owner.to_string(),
                params: join(&constructor.params),
            })?;
        if def.fails {
            return Err(HostError::Invocation(format!("{constructor} threw")));
        }
        if args.len() != constructor.params.len() {
            return Err(HostError::Invocation(format!(
                "{constructor} takes {} arguments, got {}",
                constructor.params.len(),
                args.len()
            )));
        }
        *self
            .constructions
            .lock()
            .entry(constructor.owner.clone())
            .or_insert(0) += 1;
        Ok(self.allocate(&constructor.owner, args))
    }
}
