//! Kubernetes manifest generation for application nodes.
//!
//! Each application-typed node yields a Deployment and, when it declares
//! ports, a paired Service. A failure in one node is logged and skips that
//! node only; the rest of the run continues.

use serde_yaml::{Mapping, Value};

use toscaforge_common::config::ClassifierConfig;
use toscaforge_common::error::{Result, ToscaforgeError};
use toscaforge_model::template::NodeView;
use toscaforge_model::value::{as_i64, scalar_to_string, unwrap_properties, unwrap_value};

use crate::classify;
use crate::constraint;

/// Projects every application node into Deployment/Service objects.
///
/// The externally supplied pull secret always wins over anything in the
/// template; templates never declare registry credentials.
#[must_use]
pub fn project(
    nodes: &[NodeView<'_>],
    config: &ClassifierConfig,
    image_pull_secret: &str,
) -> Vec<Value> {
    let mut manifests = Vec::new();

    for node in nodes {
        if !classify::type_name_is_application(node.type_name(), config.application_match) {
            continue;
        }
        match project_node(node, nodes, image_pull_secret) {
            Ok(objects) => manifests.extend(objects),
            Err(error) => {
                tracing::warn!(node = node.name(), %error, "skipping node");
            }
        }
    }

    manifests
}

fn project_node(
    node: &NodeView<'_>,
    nodes: &[NodeView<'_>],
    image_pull_secret: &str,
) -> Result<Vec<Value>> {
    let name = node.name();
    let properties = node.properties().map(unwrap_properties).unwrap_or_default();

    let image = properties
        .get("image")
        .and_then(scalar_to_string)
        .ok_or_else(|| ToscaforgeError::node(name, "missing image"))?;

    let replicas = properties.get("replicas").and_then(as_i64).unwrap_or(1);
    let args = properties
        .get("args")
        .and_then(Value::as_sequence)
        .cloned()
        .unwrap_or_default();
    let env = collect_env(&properties);
    let ports = collect_ports(name, &properties)?;
    let (volumes, volume_mounts) = collect_volumes(node, nodes)?;
    let node_selector = collect_node_selector(node);

    let mut container = Mapping::new();
    put(&mut container, "name", Value::String(name.to_owned()));
    put(&mut container, "image", Value::String(image));
    if !args.is_empty() {
        put(&mut container, "args", Value::Sequence(args));
    }
    if !env.is_empty() {
        put(&mut container, "env", Value::Sequence(env));
    }
    if !ports.container.is_empty() {
        put(&mut container, "ports", Value::Sequence(ports.container));
    }
    if !volume_mounts.is_empty() {
        put(&mut container, "volumeMounts", Value::Sequence(volume_mounts));
    }

    let mut pod_spec = Mapping::new();
    put(
        &mut pod_spec,
        "imagePullSecrets",
        Value::Sequence(vec![single("name", Value::String(image_pull_secret.to_owned()))]),
    );
    if !node_selector.is_empty() {
        put(&mut pod_spec, "nodeSelector", Value::Mapping(node_selector));
    }
    put(&mut pod_spec, "containers", Value::Sequence(vec![Value::Mapping(container)]));
    if !volumes.is_empty() {
        put(&mut pod_spec, "volumes", Value::Sequence(volumes));
    }

    let app_label = single("app", Value::String(name.to_owned()));

    let mut spec = Mapping::new();
    put(&mut spec, "replicas", Value::from(replicas));
    put(&mut spec, "selector", single("matchLabels", app_label.clone()));
    let mut pod_template = Mapping::new();
    put(&mut pod_template, "metadata", single("labels", app_label.clone()));
    put(&mut pod_template, "spec", Value::Mapping(pod_spec));
    put(&mut spec, "template", Value::Mapping(pod_template));

    let mut deployment = Mapping::new();
    put(&mut deployment, "apiVersion", Value::String("apps/v1".into()));
    put(&mut deployment, "kind", Value::String("Deployment".into()));
    put(&mut deployment, "metadata", single("name", Value::String(name.to_owned())));
    put(&mut deployment, "spec", Value::Mapping(spec));

    let mut objects = vec![Value::Mapping(deployment)];

    if !ports.service.is_empty() {
        let service_type = if ports.has_node_port { "NodePort" } else { "ClusterIP" };
        let mut spec = Mapping::new();
        put(&mut spec, "type", Value::String(service_type.into()));
        put(&mut spec, "selector", app_label);
        put(&mut spec, "ports", Value::Sequence(ports.service));

        let mut service = Mapping::new();
        put(&mut service, "apiVersion", Value::String("v1".into()));
        put(&mut service, "kind", Value::String("Service".into()));
        put(&mut service, "metadata", single("name", Value::String(name.to_owned())));
        put(&mut service, "spec", Value::Mapping(spec));
        objects.push(Value::Mapping(service));
    }

    Ok(objects)
}

struct Ports {
    container: Vec<Value>,
    service: Vec<Value>,
    has_node_port: bool,
}

fn collect_ports(name: &str, properties: &Mapping) -> Result<Ports> {
    let mut ports = Ports {
        container: Vec::new(),
        service: Vec::new(),
        has_node_port: false,
    };

    let entries = properties
        .get("ports")
        .and_then(Value::as_sequence)
        .map_or(&[][..], Vec::as_slice);
    for entry in entries {
        // Port and target default from one another; at least one must exist.
        let declared = entry.get("port").and_then(as_i64);
        let target = entry.get("targetPort").and_then(as_i64);
        let port = declared.or(target).ok_or_else(|| {
            ToscaforgeError::node(name, "port entry has neither 'port' nor 'targetPort'")
        })?;
        let target = target.unwrap_or(port);
        let protocol = entry
            .get("protocol")
            .and_then(scalar_to_string)
            .unwrap_or_else(|| "TCP".into())
            .to_uppercase();
        let node_port = entry.get("nodePort").and_then(as_i64);

        let mut container_port = Mapping::new();
        put(&mut container_port, "containerPort", Value::from(target));
        put(&mut container_port, "protocol", Value::String(protocol.clone()));
        ports.container.push(Value::Mapping(container_port));

        let mut service_port = Mapping::new();
        let port_name = entry
            .get("name")
            .and_then(scalar_to_string)
            .unwrap_or_else(|| format!("port-{port}"));
        put(&mut service_port, "name", Value::String(port_name));
        put(&mut service_port, "port", Value::from(port));
        put(&mut service_port, "targetPort", Value::from(target));
        put(&mut service_port, "protocol", Value::String(protocol));
        if let Some(node_port) = node_port {
            put(&mut service_port, "nodePort", Value::from(node_port));
            ports.has_node_port = true;
        }
        ports.service.push(Value::Mapping(service_port));
    }

    Ok(ports)
}

fn collect_env(properties: &Mapping) -> Vec<Value> {
    let mut env = Vec::new();
    let entries = properties
        .get("env")
        .and_then(Value::as_sequence)
        .map_or(&[][..], Vec::as_slice);
    for entry in entries {
        // Only mappings carrying a name are kept.
        let Some(name) = entry.get("name").and_then(scalar_to_string) else {
            continue;
        };
        let value = entry
            .get("value")
            .and_then(scalar_to_string)
            .unwrap_or_default();
        let mut var = Mapping::new();
        put(&mut var, "name", Value::String(name));
        put(&mut var, "value", Value::String(value));
        env.push(Value::Mapping(var));
    }
    env
}

/// Resolves `volume` requirements into host-path volumes plus mounts.
fn collect_volumes(
    node: &NodeView<'_>,
    nodes: &[NodeView<'_>],
) -> Result<(Vec<Value>, Vec<Value>)> {
    let mut volumes = Vec::new();
    let mut mounts = Vec::new();

    for requirement in node.requirements() {
        let Some(reference) = requirement.get("volume") else {
            continue;
        };
        let Some(volume_name) = reference
            .as_str()
            .or_else(|| reference.get("node").and_then(Value::as_str))
        else {
            continue;
        };

        let referenced = nodes
            .iter()
            .find(|n| n.name() == volume_name)
            .ok_or_else(|| {
                ToscaforgeError::node(
                    node.name(),
                    format!("volume requirement references unknown node '{volume_name}'"),
                )
            })?;

        let Some(path) = referenced
            .property("path")
            .map(unwrap_value)
            .as_ref()
            .and_then(scalar_to_string)
        else {
            continue;
        };

        let mut host_path = Mapping::new();
        put(&mut host_path, "path", Value::String(path.clone()));
        put(&mut host_path, "type", Value::String("DirectoryOrCreate".into()));
        let mut volume = Mapping::new();
        put(&mut volume, "name", Value::String(volume_name.to_owned()));
        put(&mut volume, "hostPath", Value::Mapping(host_path));
        volumes.push(Value::Mapping(volume));

        let mut mount = Mapping::new();
        put(&mut mount, "name", Value::String(volume_name.to_owned()));
        put(&mut mount, "mountPath", Value::String(path));
        mounts.push(Value::Mapping(mount));
    }

    Ok((volumes, mounts))
}

/// Resolves `host` requirements into a node selector.
///
/// Two schema generations exist: a literal hostname string, and an embedded
/// node filter whose label constraints become the selector. Both are
/// accepted.
fn collect_node_selector(node: &NodeView<'_>) -> Mapping {
    let mut selector = Mapping::new();

    for requirement in node.requirements() {
        let Some(host) = requirement.get("host") else {
            continue;
        };
        match host {
            Value::String(hostname) => {
                put(
                    &mut selector,
                    "kubernetes.io/hostname",
                    Value::String(hostname.clone()),
                );
            }
            Value::Mapping(host) => {
                if let Some(filter) = host.get("node_filter") {
                    for (key, value) in constraint::resolve_labels(filter) {
                        let _ = selector.insert(Value::String(key), Value::String(value));
                    }
                }
            }
            _ => {}
        }
    }

    selector
}

fn put(map: &mut Mapping, key: &str, value: Value) {
    let _ = map.insert(Value::String(key.to_owned()), value);
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Mapping::new();
    put(&mut map, key, value);
    Value::Mapping(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates(text: &str) -> Mapping {
        serde_yaml::from_str(text).expect("fixture parses")
    }

    fn views(templates: &Mapping) -> Vec<NodeView<'_>> {
        templates
            .iter()
            .filter_map(|(name, data)| name.as_str().map(|n| NodeView::new(n, data)))
            .collect()
    }

    fn strict() -> ClassifierConfig {
        ClassifierConfig {
            application_match: toscaforge_common::config::ApplicationMatch::ExactSuffix,
            ..ClassifierConfig::default()
        }
    }

    const WEB_NODE: &str = "\
web:
  type: eu.example::WebApplication
  properties:
    image: nginx:1.25
    ports:
      - port: 80
";

    #[test]
    fn application_match_mode_gates_manifest_generation() {
        let nodes = templates(
            "app:\n  type: eu.example::ApplicationBase\n  properties:\n    image: 'img:1'\n",
        );
        // ApplicationBase only matches the lenient substring rule.
        assert!(project(&views(&nodes), &strict(), "regcred").is_empty());
        assert_eq!(
            project(&views(&nodes), &ClassifierConfig::default(), "regcred").len(),
            1
        );
    }

    #[test]
    fn deployment_and_service_for_simple_application() {
        let nodes = templates(WEB_NODE);
        let manifests = project(&views(&nodes), &strict(), "regcred");
        assert_eq!(manifests.len(), 2);

        let deployment = &manifests[0];
        assert_eq!(deployment.get("kind").and_then(Value::as_str), Some("Deployment"));
        let spec = deployment.get("spec").expect("spec");
        assert_eq!(spec.get("replicas").and_then(Value::as_i64), Some(1));
        let container = spec
            .get("template")
            .and_then(|t| t.get("spec"))
            .and_then(|s| s.get("containers"))
            .and_then(Value::as_sequence)
            .and_then(|c| c.first())
            .expect("container");
        assert_eq!(container.get("name").and_then(Value::as_str), Some("web"));
        assert_eq!(container.get("image").and_then(Value::as_str), Some("nginx:1.25"));
        let container_port = container
            .get("ports")
            .and_then(Value::as_sequence)
            .and_then(|p| p.first())
            .expect("container port");
        assert_eq!(
            container_port.get("containerPort").and_then(Value::as_i64),
            Some(80)
        );
        assert_eq!(container_port.get("protocol").and_then(Value::as_str), Some("TCP"));

        let service = &manifests[1];
        assert_eq!(service.get("kind").and_then(Value::as_str), Some("Service"));
        let spec = service.get("spec").expect("spec");
        assert_eq!(spec.get("type").and_then(Value::as_str), Some("ClusterIP"));
        let port = spec
            .get("ports")
            .and_then(Value::as_sequence)
            .and_then(|p| p.first())
            .expect("service port");
        assert_eq!(port.get("name").and_then(Value::as_str), Some("port-80"));
        assert_eq!(port.get("port").and_then(Value::as_i64), Some(80));
        assert_eq!(port.get("targetPort").and_then(Value::as_i64), Some(80));
    }

    #[test]
    fn node_port_switches_service_type() {
        let nodes = templates(
            "web:\n\
             \x20 type: eu.example::WebApplication\n\
             \x20 properties:\n\
             \x20   image: nginx:1.25\n\
             \x20   ports: [{port: 80, nodePort: 30080}]\n",
        );
        let manifests = project(&views(&nodes), &strict(), "regcred");
        let service = &manifests[1];
        let spec = service.get("spec").expect("spec");
        assert_eq!(spec.get("type").and_then(Value::as_str), Some("NodePort"));
    }

    #[test]
    fn missing_image_skips_only_that_node() {
        let nodes = templates(
            "a:\n\
             \x20 type: eu.example::WebApplication\n\
             \x20 properties: {image: 'a:1'}\n\
             broken:\n\
             \x20 type: eu.example::WebApplication\n\
             \x20 properties: {replicas: 2}\n\
             c:\n\
             \x20 type: eu.example::Microservice\n\
             \x20 properties: {image: 'c:1'}\n",
        );
        let manifests = project(&views(&nodes), &strict(), "regcred");
        // Two deployments, no services (no ports declared).
        assert_eq!(manifests.len(), 2);
        let names: Vec<&str> = manifests
            .iter()
            .filter_map(|m| m.get("metadata").and_then(|md| md.get("name")).and_then(Value::as_str))
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn non_application_nodes_are_ignored() {
        let nodes = templates(
            "vm:\n\
             \x20 type: eu.example::Compute::Resource\n\
             \x20 properties: {image: 'ignored'}\n",
        );
        assert!(project(&views(&nodes), &strict(), "regcred").is_empty());
    }

    #[test]
    fn volumes_resolve_through_referenced_node() {
        let nodes = templates(
            "app:\n\
             \x20 type: eu.example::WebApplication\n\
             \x20 properties: {image: 'app:1'}\n\
             \x20 requirements:\n\
             \x20   - volume: data\n\
             data:\n\
             \x20 type: eu.example::BlockStorage\n\
             \x20 properties: {path: /mnt/data}\n",
        );
        let manifests = project(&views(&nodes), &strict(), "regcred");
        assert_eq!(manifests.len(), 1);
        let pod_spec = manifests[0]
            .get("spec")
            .and_then(|s| s.get("template"))
            .and_then(|t| t.get("spec"))
            .expect("pod spec");
        let volume = pod_spec
            .get("volumes")
            .and_then(Value::as_sequence)
            .and_then(|v| v.first())
            .expect("volume");
        assert_eq!(volume.get("name").and_then(Value::as_str), Some("data"));
        assert_eq!(
            volume.get("hostPath").and_then(|h| h.get("path")).and_then(Value::as_str),
            Some("/mnt/data")
        );
        let mount = pod_spec
            .get("containers")
            .and_then(Value::as_sequence)
            .and_then(|c| c.first())
            .and_then(|c| c.get("volumeMounts"))
            .and_then(Value::as_sequence)
            .and_then(|m| m.first())
            .expect("mount");
        assert_eq!(mount.get("mountPath").and_then(Value::as_str), Some("/mnt/data"));
    }

    #[test]
    fn missing_volume_node_fails_that_node() {
        let nodes = templates(
            "app:\n\
             \x20 type: eu.example::WebApplication\n\
             \x20 properties: {image: 'app:1'}\n\
             \x20 requirements:\n\
             \x20   - volume: ghost\n",
        );
        assert!(project(&views(&nodes), &strict(), "regcred").is_empty());
    }

    #[test]
    fn literal_host_becomes_hostname_selector() {
        let nodes = templates(
            "app:\n\
             \x20 type: eu.example::WebApplication\n\
             \x20 properties: {image: 'app:1'}\n\
             \x20 requirements:\n\
             \x20   - host: worker-3\n",
        );
        let manifests = project(&views(&nodes), &strict(), "regcred");
        let selector = manifests[0]
            .get("spec")
            .and_then(|s| s.get("template"))
            .and_then(|t| t.get("spec"))
            .and_then(|s| s.get("nodeSelector"))
            .expect("selector");
        assert_eq!(
            selector.get("kubernetes.io/hostname").and_then(Value::as_str),
            Some("worker-3")
        );
    }

    #[test]
    fn filter_host_becomes_label_selector() {
        let nodes = templates(
            "app:\n\
             \x20 type: eu.example::WebApplication\n\
             \x20 properties: {image: 'app:1'}\n\
             \x20 requirements:\n\
             \x20   - host:\n\
             \x20       node: vm\n\
             \x20       node_filter:\n\
             \x20         $and:\n\
             \x20           - $equal: [{$get_property: [SELF, TARGET, CAPABILITY, resource, labels, zone]}, edge-1]\n",
        );
        let manifests = project(&views(&nodes), &strict(), "regcred");
        let selector = manifests[0]
            .get("spec")
            .and_then(|s| s.get("template"))
            .and_then(|t| t.get("spec"))
            .and_then(|s| s.get("nodeSelector"))
            .expect("selector");
        assert_eq!(selector.get("zone").and_then(Value::as_str), Some("edge-1"));
    }

    #[test]
    fn pull_secret_is_always_injected() {
        let nodes = templates(WEB_NODE);
        let manifests = project(&views(&nodes), &strict(), "my-secret");
        let secrets = manifests[0]
            .get("spec")
            .and_then(|s| s.get("template"))
            .and_then(|t| t.get("spec"))
            .and_then(|s| s.get("imagePullSecrets"))
            .and_then(Value::as_sequence)
            .expect("pull secrets");
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].get("name").and_then(Value::as_str), Some("my-secret"));
    }

    #[test]
    fn env_entries_without_name_are_dropped() {
        let nodes = templates(
            "app:\n\
             \x20 type: eu.example::WebApplication\n\
             \x20 properties:\n\
             \x20   image: 'app:1'\n\
             \x20   env:\n\
             \x20     - {name: MODE, value: fast}\n\
             \x20     - {value: orphan}\n\
             \x20     - {name: LEVEL}\n",
        );
        let manifests = project(&views(&nodes), &strict(), "regcred");
        let env = manifests[0]
            .get("spec")
            .and_then(|s| s.get("template"))
            .and_then(|t| t.get("spec"))
            .and_then(|s| s.get("containers"))
            .and_then(Value::as_sequence)
            .and_then(|c| c.first())
            .and_then(|c| c.get("env"))
            .and_then(Value::as_sequence)
            .expect("env");
        assert_eq!(env.len(), 2);
        assert_eq!(env[1].get("name").and_then(Value::as_str), Some("LEVEL"));
        assert_eq!(env[1].get("value").and_then(Value::as_str), Some(""));
    }
}
