//! In-page readiness check sent as the probe's `execute_async` script.
//!
//! The script runs in the browser. Its callback receives nothing once the
//! page has no pending asynchronous work, or an error message when the
//! check cannot run.

use serde::{Deserialize, Serialize};

use crate::config::WaitStrategy;

const ROOT_SELECTOR_PLACEHOLDER: &str = "__ROOT_SELECTOR__";

const WAIT_FOR_STABLE_FN: &str = r#"function(callback) {
  var rootSelector = __ROOT_SELECTOR__;
  var el = document.querySelector(rootSelector);

  try {
    if (window.getAngularTestability) {
      window.getAngularTestability(el).whenStable(callback);
      return;
    }
    if (!window.angular) {
      throw new Error('angular could not be found on the window');
    }
    if (angular.getTestability) {
      angular.getTestability(el).whenStable(callback);
    } else {
      if (!angular.element(el).injector()) {
        throw new Error('root element (' + rootSelector + ') has no injector.' +
           ' this may mean it is not inside ng-app.');
      }
      angular.element(el).injector().get('$browser').
          notifyWhenNoOutstandingRequests(callback);
    }
  } catch (err) {
    callback(err.message);
  }
}"#;

// Resolves once every registered application is stable. A page with no
// registered applications has nothing pending.
const WAIT_FOR_ALL_STABLE_FN: &str = r#"function(callback) {
  try {
    var testabilities = window.getAllAngularTestabilities();
    var count = testabilities.length;
    if (count === 0) {
      callback();
      return;
    }
    var decrement = function() {
      count--;
      if (count === 0) {
        callback();
      }
    };
    testabilities.forEach(function(testability) {
      testability.whenStable(decrement);
    });
  } catch (err) {
    callback(err.message);
  }
}"#;

/// Build the readiness-check script. `root_selector` only applies to
/// [`WaitStrategy::Root`].
pub fn readiness_script(strategy: WaitStrategy, root_selector: &str) -> String {
    let function = match strategy {
        WaitStrategy::Root => {
            // A JSON string literal is also a valid JS string literal.
            let selector = serde_json::Value::from(root_selector).to_string();
            WAIT_FOR_STABLE_FN.replace(ROOT_SELECTOR_PLACEHOLDER, &selector)
        }
        WaitStrategy::All => WAIT_FOR_ALL_STABLE_FN.to_string(),
    };
    format!("return ({function}).apply(null, arguments);")
}

/// Body of the probe command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbePayload {
    pub script: String,
    pub args: Vec<serde_json::Value>,
}

impl ProbePayload {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            args: Vec::new(),
        }
    }

    pub fn to_body(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
