//! HostRuntime trait: the only way the delivery stack talks to a host.
//! Implementations wrap whatever introspection the host offers; tests and
//! the CLI use `ManifestHost`.

use std::sync::Arc;

use audience_core::{EnumConstant, HostValue};

use crate::error::HostError;
use crate::symbol::{ConstructorSymbol, FieldSymbol, MethodSymbol, TypeRef};

/// Type metadata lookup and invocation on a live host.
pub trait HostRuntime: Send + Sync {
    /// Runtime type of the host's server implementation object.
    fn server_type(&self) -> TypeRef;

    /// Resolve a type by fully qualified name.
    fn find_type(&self, name: &str) -> Result<TypeRef, HostError>;

    /// Public member types declared inside `owner`.
    fn nested_types(&self, owner: &TypeRef) -> Vec<TypeRef>;

    /// Whether values of `ty` can be used where `target` is expected.
    fn is_assignable(&self, ty: &TypeRef, target: &str) -> bool;

    /// All public methods of `owner`, in declaration order.
    fn methods(&self, owner: &TypeRef) -> Vec<MethodSymbol>;

    /// Public field `name` of `owner`.
    fn field(&self, owner: &TypeRef, name: &str) -> Result<FieldSymbol, HostError>;

    /// Public constructor of `owner` with exactly `params`.
    fn constructor(
        &self,
        owner: &TypeRef,
        params: &[TypeRef],
    ) -> Result<ConstructorSymbol, HostError>;

    /// Declared constants of an enumeration type, in declaration order.
    fn enum_constants(&self, ty: &TypeRef) -> Result<Vec<EnumConstant>, HostError>;

    /// Whether `value` is an instance of `ty`.
    fn is_instance(&self, value: &HostValue, ty: &TypeRef) -> bool;

    fn invoke(
        &self,
        method: &MethodSymbol,
        receiver: Option<&HostValue>,
        args: &[HostValue],
    ) -> Result<HostValue, HostError>;

    fn read_field(&self, field: &FieldSymbol, target: &HostValue) -> Result<HostValue, HostError>;

    fn construct(
        &self,
        constructor: &ConstructorSymbol,
        args: Vec<HostValue>,
    ) -> Result<HostValue, HostError>;

    /// Public method `name` of `owner` with exactly `params`.
    fn method(
        &self,
        owner: &TypeRef,
        name: &str,
        params: &[TypeRef],
    ) -> Result<MethodSymbol, HostError> {
        self.methods(owner)
            .into_iter()
            .find(|m| m.name == name && m.params == params)
            .ok_or_else(|| HostError::MissingMethod {
                owner: owner.to_string(),
                name: name.to_owned(),
            })
    }
}

impl<T: HostRuntime + ?Sized> HostRuntime for &T {
    fn server_type(&self) -> TypeRef {
        (**self).server_type()
    }

    fn find_type(&self, name: &str) -> Result<TypeRef, HostError> {
        (**self).find_type(name)
    }

    fn nested_types(&self, owner: &TypeRef) -> Vec<TypeRef> {
        (**self).nested_types(owner)
    }

    fn is_assignable(&self, ty: &TypeRef, target: &str) -> bool {
        (**self).is_assignable(ty, target)
    }

    fn methods(&self, owner: &TypeRef) -> Vec<MethodSymbol> {
        (**self).methods(owner)
    }

    fn field(&self, owner: &TypeRef, name: &str) -> Result<FieldSymbol, HostError> {
        (**self).field(owner, name)
    }

    fn constructor(
        &self,
        owner: &TypeRef,
        params: &[TypeRef],
    ) -> Result<ConstructorSymbol, HostError> {
        (**self).constructor(owner, params)
    }

    fn enum_constants(&self, ty: &TypeRef) -> Result<Vec<EnumConstant>, HostError> {
        (**self).enum_constants(ty)
    }

    fn is_instance(&self, value: &HostValue, ty: &TypeRef) -> bool {
        (**self).is_instance(value, ty)
    }

    fn invoke(
        &self,
        method: &MethodSymbol,
        receiver: Option<&HostValue>,
        args: &[HostValue],
    ) -> Result<HostValue, HostError> {
        (**self).invoke(method, receiver, args)
    }

    fn read_field(&self, field: &FieldSymbol, target: &HostValue) -> Result<HostValue, HostError> {
        (**self).read_field(field, target)
    }

    fn construct(
        &self,
        constructor: &ConstructorSymbol,
        args: Vec<HostValue>,
    ) -> Result<HostValue, HostError> {
        (**self).construct(constructor, args)
    }

    fn method(
        &self,
        owner: &TypeRef,
        name: &str,
        params: &[TypeRef],
    ) -> Result<MethodSymbol, HostError> {
        (**self).method(owner, name, params)
    }
}

impl<T: HostRuntime + ?Sized> HostRuntime for Arc<T> {
    fn server_type(&self) -> TypeRef {
        (**self).server_type()
    }

    fn find_type(&self, name: &str) -> Result<TypeRef, HostError> {
        (**self).find_type(name)
    }

    fn nested_types(&self, owner: &TypeRef) -> Vec<TypeRef> {
        (**self).nested_types(owner)
    }

    fn is_assignable(&self, ty: &TypeRef, target: &str) -> bool {
        (**self).is_assignable(ty, target)
    }

    fn methods(&self, owner: &TypeRef) -> Vec<MethodSymbol> {
        (**self).methods(owner)
    }

    fn field(&self, owner: &TypeRef, name: &str) -> Result<FieldSymbol, HostError> {
        (**self).field(owner, name)
    }

    fn constructor(
        &self,
        owner: &TypeRef,
        params: &[TypeRef],
    ) -> Result<ConstructorSymbol, HostError> {
        (**self).constructor(owner, params)
    }

    fn enum_constants(&self, ty: &TypeRef) -> Result<Vec<EnumConstant>, HostError> {
        (**self).enum_constants(ty)
    }

    fn is_instance(&self, value: &HostValue, ty: &TypeRef) -> bool {
        (**self).is_instance(value, ty)
    }

    fn invoke(
        &self,
        method: &MethodSymbol,
        receiver: Option<&HostValue>,
        args: &[HostValue],
    ) -> Result<HostValue, HostError> {
        (**self).invoke(method, receiver, args)
    }

    fn read_field(&self, field: &FieldSymbol, target: &HostValue) -> Result<HostValue, HostError> {
        (**self).read_field(field, target)
    }

    fn construct(
        &self,
        constructor: &ConstructorSymbol,
        args: Vec<HostValue>,
    ) -> Result<HostValue, HostError> {
        (**self).construct(constructor, args)
    }

    fn method(
        &self,
        owner: &TypeRef,
        name: &str,
        params: &[TypeRef],
    ) -> Result<MethodSymbol, HostError> {
        (**self).method(owner, name, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Host that declares one type with two overloads of `a`.
    struct Mock;

    impl HostRuntime for Mock {
        fn server_type(&self) -> TypeRef {
            TypeRef::new("mock.Server")
        }
        fn find_type(&self, name: &str) -> Result<TypeRef, HostError> {
            Err(HostError::MissingType(name.to_owned()))
        }
        fn nested_types(&self, _owner: &TypeRef) -> Vec<TypeRef> {
            Vec::new()
        }
        fn is_assignable(&self, _ty: &TypeRef, _target: &str) -> bool {
            false
        }
        fn methods(&self, owner: &TypeRef) -> Vec<MethodSymbol> {
            [TypeRef::string(), TypeRef::int()]
                .into_iter()
                .map(|param| MethodSymbol {
                    owner: owner.clone(),
                    name: "a".to_owned(),
                    params: vec![param],
                    returns: TypeRef::new(TypeRef::VOID),
                    is_static: true,
                })
                .collect()
        }
        fn field(&self, owner: &TypeRef, name: &str) -> Result<FieldSymbol, HostError> {
            Err(HostError::MissingField {
                owner: owner.to_string(),
                name: name.to_owned(),
            })
        }
        fn constructor(
            &self,
            owner: &TypeRef,
            params: &[TypeRef],
        ) -> Result<ConstructorSymbol, HostError> {
            Ok(ConstructorSymbol {
                owner: owner.clone(),
                params: params.to_vec(),
            })
        }
        fn enum_constants(&self, ty: &TypeRef) -> Result<Vec<EnumConstant>, HostError> {
            Ok(["X", "Y"]
                .iter()
                .enumerate()
                .map(|(ordinal, name)| EnumConstant {
                    owner: ty.to_string(),
                    name: (*name).to_owned(),
                    ordinal,
                })
                .collect())
        }
        fn is_instance(&self, _value: &HostValue, _ty: &TypeRef) -> bool {
            false
        }
        fn invoke(
            &self,
            _method: &MethodSymbol,
            _receiver: Option<&HostValue>,
            _args: &[HostValue],
        ) -> Result<HostValue, HostError> {
            Ok(HostValue::Null)
        }
        fn read_field(
            &self,
            _field: &FieldSymbol,
            _target: &HostValue,
        ) -> Result<HostValue, HostError> {
            Ok(HostValue::Null)
        }
        fn construct(
            &self,
            _constructor: &ConstructorSymbol,
            _args: Vec<HostValue>,
        ) -> Result<HostValue, HostError> {
            Ok(HostValue::Null)
        }
    }

    #[test]
    fn method_lookup_matches_params_exactly() {
        let owner = TypeRef::new("mock.Type");
        let found = Mock
            .method(&owner, "a", &[TypeRef::int()])
            .expect("overload exists");
        assert_eq!(found.params, vec![TypeRef::int()]);

        let err = Mock.method(&owner, "a", &[]).expect_err("no nullary overload");
        assert!(matches!(err, HostError::MissingMethod { .. }));
    }

    #[test]
    fn blanket_ref_and_arc_impls() {
        let mock = Mock;
        let r: &Mock = &mock;
        assert_eq!(r.server_type().as_str(), "mock.Server");

        let shared: Arc<dyn HostRuntime> = Arc::new(Mock);
        assert_eq!(shared.server_type().simple_name(), "Server");
    }
}
