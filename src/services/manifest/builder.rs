use super::model::{
    adlcp_namespace_for, is_scorm_2004_version, scorm_type_attr_for, Attributes, Item,
    ManifestDocument, ManifestMetadata, Organization, Organizations, Resource, ResourceFile,
    Resources, ADLCP_XMLNS_ATTR, IMSCP_NAMESPACE, SCHEMA_NAME,
};

pub const DEFAULT_ORGANIZATION_ID: &str = "ORG-1";
pub const DEFAULT_ITEM_ID: &str = "ITEM-1";
pub const DEFAULT_RESOURCE_ID: &str = "RES-1";

/// Builds the minimal single-SCO manifest used when a package has none, or
/// when its manifest is beyond repair.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    identifier: String,
    title: String,
    schema_version: String,
    launch_href: String,
}

impl ManifestBuilder {
    pub fn new(launch_href: &str) -> Self {
        Self {
            identifier: "MANIFEST-1".to_string(),
            title: "Course".to_string(),
            schema_version: "1.2".to_string(),
            launch_href: launch_href.to_string(),
        }
    }

    pub fn identifier(mut self, identifier: &str) -> Self {
        self.identifier = identifier.to_string();
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn schema_version(mut self, version: &str) -> Self {
        self.schema_version = version.to_string();
        self
    }

    pub fn build(self) -> ManifestDocument {
        let scorm_2004 = is_scorm_2004_version(&self.schema_version);
        let mut attributes = Attributes::default();
        attributes.set("identifier", &self.identifier);
        attributes.set("version", "1.0");
        attributes.set("xmlns", IMSCP_NAMESPACE);
        attributes.set(ADLCP_XMLNS_ATTR, adlcp_namespace_for(scorm_2004));

        let mut organizations = Organizations::default();
        organizations
            .attributes
            .set("default", DEFAULT_ORGANIZATION_ID);
        organizations
            .organizations
            .push(default_organization(&self.title, DEFAULT_RESOURCE_ID));

        let mut resources = Resources::default();
        resources.resources.push(sco_resource(
            DEFAULT_RESOURCE_ID,
            &self.launch_href,
            scorm_type_attr_for(scorm_2004),
        ));

        ManifestDocument {
            prefix: None,
            attributes,
            metadata: Some(ManifestMetadata {
                schema: Some(SCHEMA_NAME.to_string()),
                schema_version: Some(self.schema_version),
                extensions: Vec::new(),
            }),
            organizations: Some(organizations),
            resources: Some(resources),
            extensions: Vec::new(),
        }
    }
}

/// One organization with a single item pointing at `resource_id`.
pub fn default_organization(title: &str, resource_id: &str) -> Organization {
    let mut item_attrs = Attributes::default();
    item_attrs.set("identifier", DEFAULT_ITEM_ID);
    item_attrs.set("identifierref", resource_id);

    let mut org_attrs = Attributes::default();
    org_attrs.set("identifier", DEFAULT_ORGANIZATION_ID);

    Organization {
        attributes: org_attrs,
        title: Some(title.to_string()),
        items: vec![Item {
            attributes: item_attrs,
            title: Some(title.to_string()),
            items: Vec::new(),
            extensions: Vec::new(),
        }],
        extensions: Vec::new(),
    }
}

/// A web-content SCO resource launching `href`.
pub fn sco_resource(identifier: &str, href: &str, scorm_type_attr: &str) -> Resource {
    let mut attributes = Attributes::default();
    attributes.set("identifier", identifier);
    attributes.set("type", "webcontent");
    attributes.set(scorm_type_attr, "sco");
    attributes.set("href", href);

    Resource {
        attributes,
        files: vec![ResourceFile::new(href)],
        extensions: Vec::new(),
    }
}
