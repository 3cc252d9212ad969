//! The `pcluster` subcommands this tool knows how to complete.

use pcluster_common::CompletionRequest;

/// Base OS values accepted by `pcluster createami --os`
pub const CREATEAMI_BASE_OS: [&str; 6] = [
    "alinux",
    "alinux2",
    "centos7",
    "centos8",
    "ubuntu1604",
    "ubuntu1804",
];

/// Actions accepted by `pcluster dcv`
pub const DCV_ACTIONS: [&str; 1] = ["connect"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubcommandKind {
    Create,
    Update,
    Delete,
    Start,
    Stop,
    Status,
    List,
    Instances,
    Ssh,
    CreateAmi,
    Configure,
    Version,
    Dcv,
}

impl SubcommandKind {
    pub const ALL: [SubcommandKind; 13] = [
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Start,
        Self::Stop,
        Self::Status,
        Self::List,
        Self::Instances,
        Self::Ssh,
        Self::CreateAmi,
        Self::Configure,
        Self::Version,
        Self::Dcv,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Status => "status",
            Self::List => "list",
            Self::Instances => "instances",
            Self::Ssh => "ssh",
            Self::CreateAmi => "createami",
            Self::Configure => "configure",
            Self::Version => "version",
            Self::Dcv => "dcv",
        }
    }

    /// Operates on an existing cluster, so cluster names are candidates.
    pub fn requires_cluster_name(&self) -> bool {
        matches!(
            self,
            Self::Update
                | Self::Delete
                | Self::Start
                | Self::Stop
                | Self::Status
                | Self::Instances
                | Self::Ssh
        )
    }

    pub fn has_dynamic_completions(&self) -> bool {
        matches!(self, Self::CreateAmi | Self::Dcv)
    }

    /// Candidates specific to this subcommand, computed from what has been
    /// typed so far.
    pub fn dynamic_candidates(&self, request: &CompletionRequest) -> Vec<String> {
        match self {
            Self::CreateAmi => match request.previous_arg() {
                Some("-os") | Some("--os") => {
                    CREATEAMI_BASE_OS.iter().map(|os| os.to_string()).collect()
                }
                _ => Vec::new(),
            },
            Self::Dcv => {
                let typed_action = request
                    .remaining_args
                    .iter()
                    .any(|arg| DCV_ACTIONS.contains(&arg.as_str()));
                if typed_action {
                    Vec::new()
                } else {
                    DCV_ACTIONS.iter().map(|a| a.to_string()).collect()
                }
            }
            _ => Vec::new(),
        }
    }
}
