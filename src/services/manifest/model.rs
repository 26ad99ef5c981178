//! Typed view of `imsmanifest.xml`.
//!
//! Known elements are lifted into explicit fields; anything else is kept as
//! raw [`XmlElement`] extensions so a parse/serialize cycle does not drop
//! vendor content. Serialization order is fixed: metadata, organizations,
//! resources, then extensions.

use super::xml::{self, XmlElement, XmlNode};
use crate::types::PackageError;

pub const IMSCP_NAMESPACE: &str = "http://www.imsproject.org/xsd/imscp_rootv1p1p2";
pub const ADLCP_NAMESPACE: &str = "http://www.adlnet.org/xsd/adlcp_rootv1p2";
pub const ADLCP_NAMESPACE_2004: &str = "http://www.adlnet.org/xsd/adlcp_v1p3";
pub const ADLCP_XMLNS_ATTR: &str = "xmlns:adlcp";
pub const SCHEMA_NAME: &str = "ADL SCORM";

/// Ordered attribute list preserving document order and qualified names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Lookup by local name, ignoring prefix and ASCII case.
    pub fn get_local(&self, local: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| xml::local_part(k).eq_ignore_ascii_case(local) && !k.starts_with("xmlns"))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replace the value of `name`, or append it when absent.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<Vec<(String, String)>> for Attributes {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestMetadata {
    pub schema: Option<String>,
    pub schema_version: Option<String>,
    /// e.g. `lom` or `adlcp:location`.
    pub extensions: Vec<XmlElement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Item {
    pub attributes: Attributes,
    pub title: Option<String>,
    pub items: Vec<Item>,
    pub extensions: Vec<XmlElement>,
}

impl Item {
    pub fn identifier(&self) -> Option<&str> {
        self.attributes.get("identifier")
    }

    pub fn identifierref(&self) -> Option<&str> {
        self.attributes.get("identifierref")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Organization {
    pub attributes: Attributes,
    pub title: Option<String>,
    pub items: Vec<Item>,
    pub extensions: Vec<XmlElement>,
}

impl Organization {
    pub fn identifier(&self) -> Option<&str> {
        self.attributes.get("identifier")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Organizations {
    pub attributes: Attributes,
    pub organizations: Vec<Organization>,
    pub extensions: Vec<XmlElement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceFile {
    pub attributes: Attributes,
    pub extensions: Vec<XmlElement>,
}

impl ResourceFile {
    pub fn new(href: &str) -> Self {
        let mut attributes = Attributes::default();
        attributes.set("href", href);
        Self {
            attributes,
            extensions: Vec::new(),
        }
    }

    pub fn href(&self) -> Option<&str> {
        self.attributes.get("href")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resource {
    pub attributes: Attributes,
    pub files: Vec<ResourceFile>,
    /// `dependency`, `metadata` and vendor children.
    pub extensions: Vec<XmlElement>,
}

impl Resource {
    pub fn identifier(&self) -> Option<&str> {
        self.attributes.get("identifier")
    }

    pub fn href(&self) -> Option<&str> {
        self.attributes.get("href")
    }

    /// Rewrite the launch href and make sure a matching `<file>` entry exists.
    pub fn set_href(&mut self, href: &str) {
        self.attributes.set("href", href);
        if !self.files.iter().any(|f| f.href() == Some(href)) {
            self.files.push(ResourceFile::new(href));
        }
    }

    /// Value of the SCO-type attribute (`adlcp:scormtype` / `adlcp:scormType`).
    pub fn scorm_type(&self) -> Option<&str> {
        self.attributes.get_local("scormtype")
    }

    pub fn is_sco(&self) -> bool {
        self.scorm_type()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("sco"))
    }

    pub fn file_hrefs(&self) -> Vec<&str> {
        self.files.iter().filter_map(|f| f.href()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resources {
    pub attributes: Attributes,
    pub resources: Vec<Resource>,
    pub extensions: Vec<XmlElement>,
}

/// Parsed packaging manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestDocument {
    /// Namespace prefix used on the root tag (`imscp:manifest`), if any.
    pub prefix: Option<String>,
    pub attributes: Attributes,
    pub metadata: Option<ManifestMetadata>,
    pub organizations: Option<Organizations>,
    pub resources: Option<Resources>,
    pub extensions: Vec<XmlElement>,
}

impl ManifestDocument {
    /// Parse manifest text. Any well-formedness problem, or a root other than
    /// `<manifest>`, is reported as [`PackageError::MalformedManifest`].
    pub fn parse(text: &str) -> Result<Self, PackageError> {
        let root = xml::parse_document(text).map_err(PackageError::MalformedManifest)?;
        Self::from_element(&root).map_err(PackageError::MalformedManifest)
    }

    pub fn from_element(root: &XmlElement) -> Result<Self, String> {
        if !root.is("manifest") {
            return Err(format!("root element is <{}>, expected <manifest>", root.name));
        }

        let prefix = root
            .name
            .split_once(':')
            .map(|(p, _)| p.to_string());

        let mut doc = ManifestDocument {
            prefix,
            attributes: root.attributes.clone().into(),
            ..Self::default()
        };

        for child in root.elements() {
            if child.is("metadata") && doc.metadata.is_none() {
                doc.metadata = Some(parse_metadata(child));
            } else if child.is("organizations") && doc.organizations.is_none() {
                doc.organizations = Some(parse_organizations(child));
            } else if child.is("resources") && doc.resources.is_none() {
                doc.resources = Some(parse_resources(child));
            } else {
                doc.extensions.push(child.clone());
            }
        }

        Ok(doc)
    }

    /// Pretty-printed XML document.
    pub fn to_xml(&self) -> Result<String, String> {
        xml::write_document(&self.to_element())
    }

    pub fn to_element(&self) -> XmlElement {
        let mut root = self.element("manifest", &self.attributes);

        if let Some(metadata) = &self.metadata {
            let mut el = self.element("metadata", &Attributes::default());
            if let Some(schema) = &metadata.schema {
                el = el.with_child(self.element("schema", &Attributes::default()).with_text(schema));
            }
            if let Some(version) = &metadata.schema_version {
                el = el.with_child(
                    self.element("schemaversion", &Attributes::default())
                        .with_text(version),
                );
            }
            push_all(&mut el, &metadata.extensions);
            root = root.with_child(el);
        }

        if let Some(orgs) = &self.organizations {
            let mut el = self.element("organizations", &orgs.attributes);
            for org in &orgs.organizations {
                let mut org_el = self.element("organization", &org.attributes);
                self.push_title(&mut org_el, org.title.as_deref());
                for item in &org.items {
                    org_el = org_el.with_child(self.item_element(item));
                }
                push_all(&mut org_el, &org.extensions);
                el = el.with_child(org_el);
            }
            push_all(&mut el, &orgs.extensions);
            root = root.with_child(el);
        }

        if let Some(resources) = &self.resources {
            let mut el = self.element("resources", &resources.attributes);
            for resource in &resources.resources {
                let mut res_el = self.element("resource", &resource.attributes);
                for file in &resource.files {
                    let mut file_el = self.element("file", &file.attributes);
                    push_all(&mut file_el, &file.extensions);
                    res_el = res_el.with_child(file_el);
                }
                push_all(&mut res_el, &resource.extensions);
                el = el.with_child(res_el);
            }
            push_all(&mut el, &resources.extensions);
            root = root.with_child(el);
        }

        push_all(&mut root, &self.extensions);
        root
    }

    fn qualified(&self, local: &str) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{local}"),
            None => local.to_string(),
        }
    }

    fn element(&self, local: &str, attributes: &Attributes) -> XmlElement {
        let mut el = XmlElement::new(self.qualified(local));
        el.attributes = attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        el
    }

    fn push_title(&self, parent: &mut XmlElement, title: Option<&str>) {
        if let Some(title) = title {
            parent.children.push(XmlNode::Element(
                self.element("title", &Attributes::default()).with_text(title),
            ));
        }
    }

    fn item_element(&self, item: &Item) -> XmlElement {
        let mut el = self.element("item", &item.attributes);
        self.push_title(&mut el, item.title.as_deref());
        for child in &item.items {
            el = el.with_child(self.item_element(child));
        }
        push_all(&mut el, &item.extensions);
        el
    }

    pub fn identifier(&self) -> Option<&str> {
        self.attributes.get("identifier")
    }

    pub fn schema_version(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.schema_version.as_deref())
            .filter(|v| !v.is_empty())
    }

    /// SCORM 2004 manifests spell the SCO flag `adlcp:scormType`.
    pub fn is_scorm_2004(&self) -> bool {
        self.schema_version().is_some_and(is_scorm_2004_version)
    }

    /// Human title: a localized title inside the metadata block (`lom`),
    /// falling back to the default organization's title.
    pub fn title(&self) -> Option<String> {
        let from_metadata = self.metadata.as_ref().and_then(|m| {
            m.extensions.iter().find_map(|ext| {
                let title = if ext.is("title") {
                    Some(ext)
                } else {
                    ext.descendant("title")
                }?;
                let localized = title
                    .child("langstring")
                    .or_else(|| title.child("string"))
                    .map(XmlElement::text)
                    .unwrap_or_else(|| title.text());
                Some(localized).filter(|t| !t.is_empty())
            })
        });

        from_metadata.or_else(|| {
            self.default_organization()
                .and_then(|o| o.title.clone())
                .filter(|t| !t.is_empty())
        })
    }

    /// Organization named by `organizations@default`, else the first one.
    pub fn default_organization(&self) -> Option<&Organization> {
        let orgs = self.organizations.as_ref()?;
        let default_id = orgs.attributes.get("default");
        default_id
            .and_then(|id| {
                orgs.organizations
                    .iter()
                    .find(|o| o.identifier() == Some(id))
            })
            .or_else(|| orgs.organizations.first())
    }

    pub fn resource_list(&self) -> &[Resource] {
        self.resources
            .as_ref()
            .map(|r| r.resources.as_slice())
            .unwrap_or_default()
    }

    /// The launch target: first resource in document order.
    pub fn primary_resource(&self) -> Option<&Resource> {
        self.resource_list().first()
    }

    pub fn primary_resource_mut(&mut self) -> Option<&mut Resource> {
        self.resources.as_mut()?.resources.first_mut()
    }

    pub fn launch_href(&self) -> Option<&str> {
        self.primary_resource().and_then(Resource::href)
    }

    pub fn organization_count(&self) -> usize {
        self.organizations
            .as_ref()
            .map(|o| o.organizations.len())
            .unwrap_or(0)
    }

    /// Items (at any depth) that reference a resource.
    pub fn referencing_item_count(&self) -> usize {
        fn count(items: &[Item]) -> usize {
            items
                .iter()
                .map(|i| usize::from(i.identifierref().is_some()) + count(&i.items))
                .sum()
        }

        self.organizations
            .as_ref()
            .map(|o| o.organizations.iter().map(|org| count(&org.items)).sum())
            .unwrap_or(0)
    }

    pub fn sco_resource_count(&self) -> usize {
        self.resource_list().iter().filter(|r| r.is_sco()).count()
    }

    /// Declare the adlcp namespace on the root. Returns true when added.
    pub fn ensure_adlcp_namespace(&mut self) -> bool {
        if self.attributes.contains(ADLCP_XMLNS_ATTR) {
            return false;
        }
        let namespace = adlcp_namespace_for(self.is_scorm_2004());
        self.attributes.set(ADLCP_XMLNS_ATTR, namespace);
        true
    }

    /// Make sure metadata carries schema identity and version. Returns the
    /// names of the pieces that had to be added.
    pub fn ensure_schema_metadata(&mut self, default_version: &str) -> Vec<&'static str> {
        let mut added = Vec::new();
        let metadata = self.metadata.get_or_insert_with(|| {
            added.push("metadata");
            ManifestMetadata::default()
        });

        if metadata.schema.as_deref().map_or(true, str::is_empty) {
            metadata.schema = Some(SCHEMA_NAME.to_string());
            added.push("schema");
        }
        if metadata.schema_version.as_deref().map_or(true, str::is_empty) {
            metadata.schema_version = Some(default_version.to_string());
            added.push("schemaversion");
        }
        added
    }

    /// Attribute name used for the SCO flag in this manifest's dialect.
    pub fn scorm_type_attr(&self) -> &'static str {
        scorm_type_attr_for(self.is_scorm_2004())
    }
}

/// `2004 3rd Edition`, `CAM 1.3` and the like.
pub fn is_scorm_2004_version(version: &str) -> bool {
    version.contains("2004") || version.contains("1.3")
}

pub fn adlcp_namespace_for(scorm_2004: bool) -> &'static str {
    if scorm_2004 {
        ADLCP_NAMESPACE_2004
    } else {
        ADLCP_NAMESPACE
    }
}

pub fn scorm_type_attr_for(scorm_2004: bool) -> &'static str {
    if scorm_2004 {
        "adlcp:scormType"
    } else {
        "adlcp:scormtype"
    }
}

fn push_all(parent: &mut XmlElement, extensions: &[XmlElement]) {
    parent
        .children
        .extend(extensions.iter().cloned().map(XmlNode::Element));
}

fn parse_metadata(el: &XmlElement) -> ManifestMetadata {
    let mut metadata = ManifestMetadata::default();
    for child in el.elements() {
        if child.is("schema") && metadata.schema.is_none() {
            metadata.schema = Some(child.text());
        } else if child.is("schemaversion") && metadata.schema_version.is_none() {
            metadata.schema_version = Some(child.text());
        } else {
            metadata.extensions.push(child.clone());
        }
    }
    metadata
}

/// Shared shape of `<organization>` and `<item>`.
fn parse_titled(el: &XmlElement) -> (Option<String>, Vec<Item>, Vec<XmlElement>) {
    let mut title = None;
    let mut items = Vec::new();
    let mut extensions = Vec::new();

    for child in el.elements() {
        if child.is("title") && title.is_none() {
            title = Some(child.text());
        } else if child.is("item") {
            items.push(parse_item(child));
        } else {
            extensions.push(child.clone());
        }
    }
    (title, items, extensions)
}

fn parse_item(el: &XmlElement) -> Item {
    let (title, items, extensions) = parse_titled(el);
    Item {
        attributes: el.attributes.clone().into(),
        title,
        items,
        extensions,
    }
}

fn parse_organizations(el: &XmlElement) -> Organizations {
    let mut orgs = Organizations {
        attributes: el.attributes.clone().into(),
        ..Organizations::default()
    };
    for child in el.elements() {
        if child.is("organization") {
            let (title, items, extensions) = parse_titled(child);
            orgs.organizations.push(Organization {
                attributes: child.attributes.clone().into(),
                title,
                items,
                extensions,
            });
        } else {
            orgs.extensions.push(child.clone());
        }
    }
    orgs
}

fn parse_resources(el: &XmlElement) -> Resources {
    let mut resources = Resources {
        attributes: el.attributes.clone().into(),
        ..Resources::default()
    };
    for child in el.elements() {
        if child.is("resource") {
            let mut resource = Resource {
                attributes: child.attributes.clone().into(),
                ..Resource::default()
            };
            for grandchild in child.elements() {
                if grandchild.is("file") {
                    resource.files.push(ResourceFile {
                        attributes: grandchild.attributes.clone().into(),
                        extensions: grandchild.elements().cloned().collect(),
                    });
                } else {
                    resource.extensions.push(grandchild.clone());
                }
            }
            resources.resources.push(resource);
        } else {
            resources.extensions.push(child.clone());
        }
    }
    resources
}
