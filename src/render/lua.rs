//! Lua annotation renderer.
//!
//! Produces a single `---@meta` file for lua-language-server: one block per
//! class followed by one block per enum. Every block starts with a blank line,
//! so blocks concatenate without separators.

use crate::model::*;
use crate::render::{RenderError, Renderer};

pub struct LuaRenderer;

/// First line of the generated file.
pub const META_HEADER: &str = "---@meta";

/// The only class whose own `Subscribe`/`Unsubscribe` functions are kept.
const EVENTS_CLASS: &str = "Events";

const BADGE_BASE_URL: &str = "https://github.com/Derpius/nanosworld-vscode/blob/master/assets";

impl Renderer for LuaRenderer {
    fn render(&self, docs: &Docs) -> Result<String, RenderError> {
        let mut output = String::from(META_HEADER);

        for class in &docs.classes {
            output.push_str(&render_class(docs, class)?);
        }
        for (name, values) in &docs.enums {
            output.push_str(&render_enum(name, values));
        }

        Ok(output)
    }

    fn file_extension(&self) -> &str {
        "lua"
    }
}

/// Badge line for a class or function.
fn authority_badge(authority: &Authority) -> String {
    let (image, label) = match authority {
        Authority::ServerOnly => ("server-only", "Server Side"),
        Authority::ClientOnly => ("client-only", "Client Side"),
        Authority::AuthorityOnly => ("authority-only", "Authority Side"),
        Authority::Both => ("both", "Client/Server Side"),
        Authority::Unknown(other) => {
            return format!("Invalid authority \"{}\" in documentation", other);
        }
    };
    format!(
        "<img src=\"{}/{}.png?raw=true\" height=\"10\"> `{}`",
        BADGE_BASE_URL, image, label
    )
}

/// `@docstring`, or nothing when there is no description.
fn inline_docstring(doc: &Description) -> String {
    let docstring = doc.docstring();
    if docstring.is_empty() {
        docstring
    } else {
        format!("@{}", docstring)
    }
}

fn param_docstring(param: &Parameter) -> String {
    let mut docstring = inline_docstring(&param.doc);
    if let Some(default) = param.default.as_deref().filter(|d| *d != NIL_DEFAULT) {
        let default = if default.is_empty() { "\"\"" } else { default };
        let lead = if docstring.is_empty() { "@" } else { " " };
        docstring.push_str(&format!("{}(Default: {})", lead, default));
    }
    docstring
}

/// `@param` lines and the comma-separated call signature.
fn render_params(params: &[Parameter]) -> (String, String) {
    let mut lines = String::new();
    let mut names = Vec::with_capacity(params.len());

    for param in params {
        let name = param.lua_name();
        lines.push_str(&format!(
            "\n---@param {}{} {} {}",
            name,
            if param.is_optional() { "?" } else { "" },
            param.ty,
            param_docstring(param)
        ));
        names.push(name);
    }

    (lines, names.join(", "))
}

fn render_return(ret: Option<&Return>) -> String {
    match ret {
        Some(ret) => format!("\n---@return {} @{}", ret.ty, ret.doc.docstring()),
        None => String::new(),
    }
}

/// One function block; `accessor` is `Class.` or `Class:`.
fn render_function(func: &Function, accessor: &str) -> String {
    let (param_lines, names) = render_params(func.parameters.as_deref().unwrap_or_default());
    format!(
        "\n\n---{}\n---\n---{}{}{}\nfunction {}{}({}) end",
        authority_badge(&func.authority),
        func.doc.docstring(),
        param_lines,
        render_return(func.returns.as_ref()),
        accessor,
        func.name,
        names
    )
}

/// Render the annotation block for one class.
///
/// Fails only when a parent in `inheritance` is not among `docs.classes`.
/// Parents are checked even for classes with no events of their own.
pub fn render_class(docs: &Docs, class: &Class) -> Result<String, RenderError> {
    let name = &class.name;

    let inheritance = match &class.inheritance {
        Some(parents) => format!(" : {}", parents.join(", ")),
        None => String::new(),
    };

    let fields: String = class
        .properties
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|prop| {
            format!(
                "\n---@field {} {} {}",
                prop.name,
                prop.ty,
                inline_docstring(&prop.doc)
            )
        })
        .collect();

    let constructor = match &class.constructor {
        Some(params) => {
            let signature = params
                .iter()
                .map(|p| format!("{}: {}", p.name, p.ty))
                .collect::<Vec<_>>()
                .join(", ");
            format!("\n---@overload fun({}): {}", signature, name)
        }
        None => String::new(),
    };

    let keep = |func: &&Function| !func.is_event_builtin() || name == EVENTS_CLASS;

    let static_functions: String = class
        .static_functions
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(keep)
        .map(|func| render_function(func, &format!("{}.", name)))
        .collect();

    let functions: String = class
        .functions
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(keep)
        .map(|func| render_function(func, &format!("{}:", name)))
        .collect();

    let events = render_subscriptions(class, &effective_events(docs, class)?);

    Ok(format!(
        "\n\n---{}\n---\n---{}\n---@class {}{}{}{}\n{} = {{}}{}{}{}{}",
        authority_badge(&class.authority),
        class.doc.docstring(),
        name,
        inheritance,
        fields,
        constructor,
        name,
        static_functions,
        functions,
        events,
        fields
    ))
}

/// Events of the direct parents, in declaration order, overlaid with the
/// class's own events. A name keeps the position of its first occurrence
/// and the definition of its last.
pub fn effective_events<'a>(docs: &'a Docs, class: &'a Class) -> Result<Vec<&'a Event>, RenderError> {
    let mut merged: Vec<&Event> = Vec::new();

    let mut overlay = |event: &'a Event| {
        match merged.iter_mut().find(|e| e.name == event.name) {
            Some(slot) => *slot = event,
            None => merged.push(event),
        }
    };

    for parent in class.parents() {
        let parent_class = docs.class(parent).ok_or_else(|| RenderError::UnknownParent {
            class: class.name.clone(),
            parent: parent.clone(),
        })?;
        parent_class.own_events().iter().for_each(&mut overlay);
    }
    class.own_events().iter().for_each(&mut overlay);

    Ok(merged)
}

/// `Subscribe`/`Unsubscribe` with one overload per effective event, or
/// nothing when there are no events.
fn render_subscriptions(class: &Class, events: &[&Event]) -> String {
    if events.is_empty() {
        return String::new();
    }

    let name = &class.name;
    let receiver = if class.static_class {
        String::new()
    } else {
        format!("self: {}, ", name)
    };

    let mut sub_overloads = String::new();
    let mut unsub_overloads = String::new();
    for event in events {
        let callback = callback_signature(name, event);
        let doc = inline_docstring(&event.doc);
        sub_overloads.push_str(&format!(
            "\n---@overload fun({}event_name: \"{}\", callback: fun({})): fun({}) {}",
            receiver, event.name, callback, callback, doc
        ));
        unsub_overloads.push_str(&format!(
            "\n---@overload fun({}event_name: \"{}\", callback: fun({})) {}",
            receiver, event.name, callback, doc
        ));
    }

    let sep = if class.static_class { "." } else { ":" };

    format!(
        "\n\n---Subscribe to an event\
         \n---@param event_name string @Name of the event to subscribe to\
         \n---@param callback function @Function to call when the event is triggered\
         \n---@return function @The callback function passed{sub}\
         \nfunction {name}{sep}Subscribe(event_name, callback) end\
         \n\n---Unsubscribe from an event\
         \n---@param event_name string @Name of the event to unsubscribe from\
         \n---@param callback? function @Optional callback to unsubscribe (if no callback is passed then all callbacks in this Package will be unsubscribed from this event){unsub}\
         \nfunction {name}{sep}Unsubscribe(event_name, callback) end",
        sub = sub_overloads,
        unsub = unsub_overloads,
        name = name,
        sep = sep,
    )
}

/// Callback parameters of an event as seen from `owner`: a leading `self`
/// argument takes the owner's type.
fn callback_signature(owner: &str, event: &Event) -> String {
    event
        .arguments
        .iter()
        .enumerate()
        .map(|(idx, arg)| {
            let ty = if idx == 0 && arg.name == "self" {
                owner
            } else {
                arg.ty.as_str()
            };
            format!("{}: {}", arg.name, ty)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render one enum as an annotated table literal.
pub fn render_enum(name: &str, values: &[EnumValue]) -> String {
    let entries = values
        .iter()
        .map(|v| format!("\n    [\"{}\"] = {}", v.key, v.literal()))
        .collect::<Vec<_>>()
        .join(",");

    format!("\n\n---@enum {}\n{} = {{{}\n}}", name, name, entries)
}
