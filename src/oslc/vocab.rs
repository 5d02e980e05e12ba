// ABOUTME: OSLC, Jazz and DNG vocabulary: namespaces, properties, headers and media types.
// ABOUTME: Every wire-level string the client sends or matches lives here.

pub mod header {
    pub const ACCEPT: &str = "Accept";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const LOCATION: &str = "Location";
    pub const OSLC_CORE_VERSION: &str = "OSLC-Core-Version";
    pub const OSLC_CORE_VERSION_2: &str = "2.0";
    pub const CONFIGURATION_CONTEXT: &str = "Configuration-Context";
    pub const REQUEST_TYPE: &str = "DoorsRP-Request-Type";
    pub const REQUEST_TYPE_PUBLIC: &str = "public 2.0";
    pub const AUTH_MSG: &str = "X-com-ibm-team-repository-web-auth-msg";
    pub const AUTH_FAILED: &str = "authfailed";
}

pub mod media {
    pub const JSON: &str = "application/json";
    pub const RDF_XML: &str = "application/rdf+xml";
    pub const TEXT: &str = "text/plain";
    pub const FORM: &str = "application/x-www-form-urlencoded";
    pub const ANY: &str = "*/*";
}

pub mod ns {
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const DCTERMS: &str = "http://purl.org/dc/terms/";
    pub const OSLC: &str = "http://open-services.net/ns/core#";
    pub const OSLC_CONFIG: &str = "http://open-services.net/ns/config#";
    pub const OSLC_AUTO: &str = "http://open-services.net/ns/auto#";
    pub const PROV: &str = "http://www.w3.org/ns/prov#";
    pub const DNG_CONFIG: &str = "http://jazz.net/ns/rm/dng/config#";
    pub const RM_TYPES: &str = "http://www.ibm.com/xmlns/rdm/types/";
    pub const JAZZ_PROCESS: &str = "http://jazz.net/ns/process#";
    pub const ACC: &str = "http://open-services.net/ns/core/acc#";
}

/// Full property and class URIs.
pub mod prop {
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const RDF_XML_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral";
    pub const RDFS_MEMBER: &str = "http://www.w3.org/2000/01/rdf-schema#member";

    pub const DC_TITLE: &str = "http://purl.org/dc/terms/title";
    pub const DC_DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const DC_IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";
    pub const DC_CREATOR: &str = "http://purl.org/dc/terms/creator";
    pub const DC_CREATED: &str = "http://purl.org/dc/terms/created";
    pub const DC_REFERENCES: &str = "http://purl.org/dc/terms/references";

    pub const OSLC_SERVICE_PROVIDER: &str = "http://open-services.net/ns/core#serviceProvider";
    pub const OSLC_MESSAGE: &str = "http://open-services.net/ns/core#message";
    pub const OSLC_CREATION_FACTORY: &str = "http://open-services.net/ns/core#CreationFactory";
    pub const OSLC_CREATION: &str = "http://open-services.net/ns/core#creation";
    pub const OSLC_RESOURCE_TYPE: &str = "http://open-services.net/ns/core#resourceType";

    pub const CONFIG_CONFIGURATION: &str = "http://open-services.net/ns/config#Configuration";
    pub const CONFIG_CHANGESET: &str = "http://open-services.net/ns/config#Changeset";
    pub const CONFIG_COMPONENT: &str = "http://open-services.net/ns/config#component";
    pub const CONFIG_STREAM: &str = "http://open-services.net/ns/config#stream";
    pub const CONFIG_OVERRIDES: &str = "http://open-services.net/ns/config#overrides";
    pub const CONFIG_PREVIOUS_BASELINE: &str = "http://open-services.net/ns/config#previousBaseline";
    pub const CONFIG_CONFIGURATIONS: &str = "http://open-services.net/ns/config#configurations";
    pub const PROV_WAS_DERIVED_FROM: &str = "http://www.w3.org/ns/prov#wasDerivedFrom";

    pub const DNG_CHANGESETS: &str = "http://jazz.net/ns/rm/dng/config#changesets";
    pub const DNG_DELIVERY_SESSION: &str = "http://jazz.net/ns/rm/dng/config#DeliverySession";
    pub const DNG_DELIVERY_SESSION_STATE: &str =
        "http://jazz.net/ns/rm/dng/config#deliverySessionState";

    pub const TYPES_SOURCE: &str = "http://www.ibm.com/xmlns/rdm/types/source";
    pub const TYPES_TARGET: &str = "http://www.ibm.com/xmlns/rdm/types/target";
    pub const TYPES_TYPE_IMPORT_SESSION: &str =
        "http://www.ibm.com/xmlns/rdm/types/TypeImportSession";

    pub const PROCESS_PROJECT_AREA: &str = "http://jazz.net/ns/process#projectArea";

    pub const AUTO_STATE: &str = "http://open-services.net/ns/auto#state";
    pub const AUTO_VERDICT: &str = "http://open-services.net/ns/auto#verdict";
}

/// Values of `oslc_auto:state` and `oslc_auto:verdict`.
pub mod auto {
    pub const IN_PROGRESS: &str = "http://open-services.net/ns/auto#inProgress";
    pub const COMPLETE: &str = "http://open-services.net/ns/auto#complete";
    pub const PASSED: &str = "http://open-services.net/ns/auto#passed";
    pub const FAILED: &str = "http://open-services.net/ns/auto#failed";
    pub const ERROR: &str = "http://open-services.net/ns/auto#error";
    pub const UNAVAILABLE: &str = "http://open-services.net/ns/auto#unavailable";
}

/// Values of `dng_config:deliverySessionState`.
pub mod delivery_state {
    pub const INITIALISED: &str = "http://jazz.net/ns/rm/dng/config#initialised";
    pub const SCOPED: &str = "http://jazz.net/ns/rm/dng/config#scoped";
    pub const DELIVERED: &str = "http://jazz.net/ns/rm/dng/config#delivered";
}

/// Unsupported local-versioning endpoints, relative to the RM base URL.
pub mod internal {
    pub const DEPENDENT_CONFIGURATIONS: &str = "/localVersionExplorer/configurations?includeArchived=false&pageStart=0&pageEnd=10&configurationId=";
    pub const ARCHIVE_WITH_DESCENDANTS: &str =
        "/localVersioning/configurations/archiveWithDescendants?configurationUri=";
    pub const IS_ARCHIVED: &str = "/localVersioning/configurations?configurationUri=";
    pub const DISCARD_CHANGESET: &str = "/localVersioning/configurations/changesets/discard";
    pub const SCENARIO_SERVICE: &str =
        "/service/com.ibm.team.repository.service.serviceability.IScenarioRestService/scenarios";
}
