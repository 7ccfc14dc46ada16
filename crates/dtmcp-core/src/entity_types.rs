//! Dynatrace entity types
//!
//! Entity ID prefixes mapped to their `dt.entity.*` Grail table names, used
//! by the entity search capability to fan a name search out over every known
//! type. The mapping follows the Dynatrace semantic dictionary and may lag
//! behind new platform releases.

/// Entity ID prefix (everything before the first hyphen) to entity type.
const ENTITY_ID_PREFIX_TO_TYPE: &[(&str, &str)] = &[
    // Core applications and services
    ("APPLICATION", "dt.entity.application"),
    ("SERVICE", "dt.entity.service"),
    ("SERVICE_INSTANCE", "dt.entity.service_instance"),
    ("MOBILE_APPLICATION", "dt.entity.mobile_application"),
    ("CUSTOM_APPLICATION", "dt.entity.custom_application"),
    // Infrastructure
    ("HOST", "dt.entity.host"),
    ("HOST_GROUP", "dt.entity.host_group"),
    ("PROCESS_GROUP", "dt.entity.process_group"),
    ("PROCESS_GROUP_INSTANCE", "dt.entity.process_group_instance"),
    ("DISK", "dt.entity.disk"),
    ("NETWORK_INTERFACE", "dt.entity.network_interface"),
    // Cloud services
    ("CLOUD_APPLICATION", "dt.entity.cloud_application"),
    (
        "CLOUD_APPLICATION_INSTANCE",
        "dt.entity.cloud_application_instance",
    ),
    (
        "CLOUD_APPLICATION_NAMESPACE",
        "dt.entity.cloud_application_namespace",
    ),
    // Containers
    ("CONTAINER_GROUP", "dt.entity.container_group"),
    (
        "CONTAINER_GROUP_INSTANCE",
        "dt.entity.container_group_instance",
    ),
    ("DCG_INSTANCE", "dt.entity.docker_container_group_instance"),
    // Environment
    ("ENVIRONMENT", "dt.entity.environment"),
    // Operating system
    ("OS", "dt.entity.os"),
    // Synthetic monitoring
    ("SYNTHETIC_TEST", "dt.entity.synthetic_test"),
    ("SYNTHETIC_LOCATION", "dt.entity.synthetic_location"),
    // Custom devices
    ("CUSTOM_DEVICE", "dt.entity.custom_device"),
    ("CUSTOM_DEVICE_GROUP", "dt.entity.custom_device_group"),
    // Geolocation
    ("GEOLOCATION", "dt.entity.geolocation"),
    // Database services
    (
        "RELATIONAL_DATABASE_SERVICE",
        "dt.entity.relational_database_service",
    ),
    // AWS
    ("EC2_INSTANCE", "dt.entity.ec2_instance"),
    ("AWS_LAMBDA_FUNCTION", "dt.entity.aws_lambda_function"),
    ("AWS_AVAILABILITY_ZONE", "dt.entity.aws_availability_zone"),
    (
        "AWS_APPLICATION_LOAD_BALANCER",
        "dt.entity.aws_application_load_balancer",
    ),
    (
        "AWS_NETWORK_LOAD_BALANCER",
        "dt.entity.aws_network_load_balancer",
    ),
    // GCP
    ("GCP_ZONE", "dt.entity.gcp_zone"),
    // Virtual machines
    ("AZURE_VM", "dt.entity.azure_vm"),
    ("OPENSTACK_VM", "dt.entity.openstack_vm"),
    // Kubernetes
    ("KUBERNETES_NODE", "dt.entity.kubernetes_node"),
    ("KUBERNETES_CLUSTER", "dt.entity.kubernetes_cluster"),
    ("KUBERNETES_SERVICE", "dt.entity.kubernetes_service"),
];

/// All known entity types, sorted. The entity search capability generates
/// its fan-out DQL in this order.
pub const DYNATRACE_ENTITY_TYPES: &[&str] = &[
    "dt.entity.application",
    "dt.entity.aws_application_load_balancer",
    "dt.entity.aws_availability_zone",
    "dt.entity.aws_lambda_function",
    "dt.entity.aws_network_load_balancer",
    "dt.entity.azure_vm",
    "dt.entity.cloud_application",
    "dt.entity.cloud_application_instance",
    "dt.entity.cloud_application_namespace",
    "dt.entity.container_group",
    "dt.entity.container_group_instance",
    "dt.entity.custom_application",
    "dt.entity.custom_device",
    "dt.entity.custom_device_group",
    "dt.entity.disk",
    "dt.entity.docker_container_group_instance",
    "dt.entity.ec2_instance",
    "dt.entity.environment",
    "dt.entity.gcp_zone",
    "dt.entity.geolocation",
    "dt.entity.host",
    "dt.entity.host_group",
    "dt.entity.kubernetes_cluster",
    "dt.entity.kubernetes_node",
    "dt.entity.kubernetes_service",
    "dt.entity.mobile_application",
    "dt.entity.network_interface",
    "dt.entity.openstack_vm",
    "dt.entity.os",
    "dt.entity.process_group",
    "dt.entity.process_group_instance",
    "dt.entity.relational_database_service",
    "dt.entity.service",
    "dt.entity.service_instance",
    "dt.entity.synthetic_location",
    "dt.entity.synthetic_test",
];

/// Map an entity ID like `PROCESS_GROUP-F84E4759809ADA84` to its entity type
/// (`dt.entity.process_group`). Returns `None` for IDs with no hyphen or an
/// unknown prefix.
pub fn entity_type_for_id(entity_id: &str) -> Option<&'static str> {
    let prefix = entity_id.split_once('-')?.0;
    ENTITY_ID_PREFIX_TO_TYPE
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, t)| *t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_lookup() {
        assert_eq!(
            entity_type_for_id("PROCESS_GROUP-F84E4759809ADA84"),
            Some("dt.entity.process_group")
        );
        assert_eq!(
            entity_type_for_id("APPLICATION-1234567890ABCDEF"),
            Some("dt.entity.application")
        );
        assert_eq!(
            entity_type_for_id("KUBERNETES_SERVICE-ABCDEF1234567890"),
            Some("dt.entity.kubernetes_service")
        );
    }

    #[test]
    fn test_entity_type_lookup_rejects_malformed_ids() {
        assert_eq!(entity_type_for_id("INVALID_ID"), None);
        assert_eq!(entity_type_for_id("NOT_A_PREFIX-123"), None);
        assert_eq!(entity_type_for_id(""), None);
    }

    #[test]
    fn test_entity_types_are_sorted() {
        let mut sorted = DYNATRACE_ENTITY_TYPES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, DYNATRACE_ENTITY_TYPES);
    }

    #[test]
    fn test_every_prefix_has_a_listed_type() {
        for (_, ty) in ENTITY_ID_PREFIX_TO_TYPE {
            assert!(
                DYNATRACE_ENTITY_TYPES.contains(ty),
                "{} missing from DYNATRACE_ENTITY_TYPES",
                ty
            );
        }
        assert_eq!(
            ENTITY_ID_PREFIX_TO_TYPE.len(),
            DYNATRACE_ENTITY_TYPES.len()
        );
    }
}
