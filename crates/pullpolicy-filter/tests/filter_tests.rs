use pullpolicy_filter::{FieldSpec, FilterError, ImageRule, PullPolicyConfig, PullPolicyFilter};
use pullpolicy_test_utils::{
    assert_yaml_eq, documents, field_values, NGINX_DEPLOYMENT, NGINX_POD, WHATEVER_CRD,
};
use pullpolicy_tree::Shape;

fn filter_for(name: &str, policy: &str) -> PullPolicyFilter {
    PullPolicyFilter::new(PullPolicyConfig::new(vec![ImageRule::new(name, policy)]))
}

fn nginx_always() -> PullPolicyFilter {
    filter_for("nginx", "Always")
}

#[test]
fn adds_missing_policy_in_pod() {
    let mut docs = documents(NGINX_POD);
    nginx_always().filter(&mut docs).unwrap();
    assert_yaml_eq(
        &docs,
        "
apiVersion: v1
kind: Pod
metadata:
  name: nginx
spec:
  containers:
  - name: nginx
    image: nginx:1.14.2
    imagePullPolicy: Always
",
    );
}

#[test]
fn missing_image_fails() {
    let mut docs = documents(
        "
apiVersion: v1
kind: Pod
metadata:
  name: nginx
spec:
  containers:
  - name: nginx
",
    );
    let err = nginx_always().filter(&mut docs).unwrap_err();
    assert!(matches!(err, FilterError::MissingField { .. }));
}

#[test]
fn containers_not_a_sequence_fails() {
    let mut docs = documents(
        "
apiVersion: example.com/v1
kind: Foo
metadata:
  name: whatever
spec:
  containers: 'not what you expected'
",
    );
    let err = nginx_always().filter(&mut docs).unwrap_err();
    assert!(matches!(
        err,
        FilterError::TypeMismatch {
            expected: Shape::Sequence,
            actual: Shape::Scalar,
            ..
        }
    ));
}

#[test]
fn container_of_wrong_type_fails() {
    let mut docs = documents(
        "
apiVersion: example.com/v1
kind: Foo
metadata:
  name: whatever
spec:
  containers:
  - 'not what you expected'
",
    );
    let err = nginx_always().filter(&mut docs).unwrap_err();
    assert!(matches!(
        err,
        FilterError::TypeMismatch {
            expected: Shape::Mapping,
            ..
        }
    ));
    assert!(err.to_string().contains("spec.containers[0]"));
}

#[test]
fn no_match_leaves_pod_unchanged() {
    let input = "
apiVersion: v1
kind: Pod
metadata:
  name: nginx
spec:
  containers:
  - name: nginx
    image: notnginx:1.14.2
";
    let mut docs = documents(input);
    nginx_always().filter(&mut docs).unwrap();
    assert_yaml_eq(&docs, input);
}

#[test]
fn updates_containers_and_init_containers() {
    let mut docs = documents(
        "
apiVersion: v1
kind: Pod
metadata:
  name: nginx
spec:
  initContainers:
  - name: nginx-init
    image: nginx:1.14.2
    imagePullPolicy: IfNotPresent
  containers:
  - name: nginx-specific
    image: nginx:1.14.2
    imagePullPolicy: IfNotPresent
  - name: nginx-latest
    image: nginx:latest
    imagePullPolicy: Always
",
    );
    let stats = nginx_always().filter_with_stats(&mut docs).unwrap();
    assert_yaml_eq(
        &docs,
        "
apiVersion: v1
kind: Pod
metadata:
  name: nginx
spec:
  initContainers:
  - name: nginx-init
    image: nginx:1.14.2
    imagePullPolicy: Always
  containers:
  - name: nginx-specific
    image: nginx:1.14.2
    imagePullPolicy: Always
  - name: nginx-latest
    image: nginx:latest
    imagePullPolicy: Always
",
    );
    assert_eq!(stats.containers, 3);
    assert_eq!(stats.updated, 2);
}

#[test]
fn adds_missing_policy_to_deployment() {
    let mut docs = documents(NGINX_DEPLOYMENT);
    nginx_always().filter(&mut docs).unwrap();
    assert_eq!(
        field_values(
            &docs[0],
            &["spec", "template", "spec", "containers"],
            "imagePullPolicy"
        ),
        vec![Some("Always".to_string())]
    );
    // default field specs do not materialize absent container lists
    let spec = docs[0].field(docs[0].root(), "spec").unwrap().unwrap();
    assert!(docs[0].field(spec, "containers").unwrap().is_none());
}

#[test]
fn deployment_without_kind_is_filtered() {
    let mut docs = documents(
        "
group: apps
apiVersion: v1
metadata:
  name: nginx
spec:
  template:
    spec:
      containers:
      - name: nginx
        image: nginx:1.14.2
",
    );
    nginx_always().filter(&mut docs).unwrap();
    assert_eq!(
        field_values(
            &docs[0],
            &["spec", "template", "spec", "containers"],
            "imagePullPolicy"
        ),
        vec![Some("Always".to_string())]
    );
}

#[test]
fn custom_field_specs_replace_defaults() {
    let config = PullPolicyConfig::new(vec![ImageRule::new("nginx", "Always")])
        .with_field_spec(FieldSpec::parse("spec/foos[]", true).unwrap());
    let mut docs = documents(
        "
apiVersion: example.com/v1
kind: Foo
metadata:
  name: nginx
spec:
  foos:
  - name: nginx
    image: nginx:1.14.2
  containers:
  - name: ignored
    image: nginx:1.14.2
",
    );
    PullPolicyFilter::new(config).filter(&mut docs).unwrap();
    assert_eq!(
        field_values(&docs[0], &["spec", "foos"], "imagePullPolicy"),
        vec![Some("Always".to_string())]
    );
    assert_eq!(
        field_values(&docs[0], &["spec", "containers"], "imagePullPolicy"),
        vec![None]
    );
}

#[test]
fn custom_field_spec_materializes_missing_list() {
    let config = PullPolicyConfig::new(vec![ImageRule::new("nginx", "Always")])
        .with_field_spec(FieldSpec::parse("spec/foos[]", true).unwrap());
    let mut docs = documents("kind: Foo\nspec:\n  replicas: 1\n");
    PullPolicyFilter::new(config).filter(&mut docs).unwrap();
    assert_yaml_eq(&docs, "kind: Foo\nspec:\n  replicas: 1\n  foos: []\n");
}

#[test]
fn custom_field_spec_without_create_is_noop() {
    let config = PullPolicyConfig::new(vec![ImageRule::new("nginx", "Always")])
        .with_field_spec(FieldSpec::parse("spec/foos[]", false).unwrap());
    let input = "kind: Foo\nspec:\n  replicas: 1\n";
    let mut docs = documents(input);
    PullPolicyFilter::new(config).filter(&mut docs).unwrap();
    assert_yaml_eq(&docs, input);
}

#[test]
fn ignores_custom_resource_definitions() {
    let mut docs = documents(WHATEVER_CRD);
    filter_for("whatever", "Always").filter(&mut docs).unwrap();
    assert_yaml_eq(&docs, WHATEVER_CRD);
}

#[test]
fn mixed_stream_only_touches_workloads() {
    let stream = format!("{NGINX_POD}---{WHATEVER_CRD}---{NGINX_DEPLOYMENT}");
    let mut docs = documents(&stream);
    let stats = filter_for("nginx", "Never")
        .filter_with_stats(&mut docs)
        .unwrap();
    assert_eq!(stats.documents, 3);
    assert_eq!(stats.excluded, 1);
    assert_eq!(stats.updated, 2);
    assert_yaml_eq(&docs[1..2], WHATEVER_CRD);
}

#[test]
fn second_pass_changes_nothing() {
    let mut docs = documents(NGINX_POD);
    let filter = nginx_always();
    filter.filter(&mut docs).unwrap();
    let once = docs.clone();
    let stats = filter.filter_with_stats(&mut docs).unwrap();
    assert_eq!(docs, once);
    assert_eq!(stats.updated, 0);
    assert_eq!(stats.containers, 1);
}

#[test]
fn config_from_yaml_drives_filter() {
    let config = PullPolicyConfig::from_yaml(
        "
images:
- name: nginx
  newValue: IfNotPresent
fieldSpecs:
- path: spec/jobTemplate/spec/template/spec/containers[]
",
    )
    .unwrap();
    let mut docs = documents(
        "
kind: CronJob
spec:
  jobTemplate:
    spec:
      template:
        spec:
          containers:
          - image: nginx
",
    );
    PullPolicyFilter::new(config).filter(&mut docs).unwrap();
    assert_eq!(
        field_values(
            &docs[0],
            &["spec", "jobTemplate", "spec", "template", "spec", "containers"],
            "imagePullPolicy"
        ),
        vec![Some("IfNotPresent".to_string())]
    );
}
